//! Age/sex buckets of a shipment manifest
//!
//! A manifest counts animals in ten cells: sex (male/female) crossed with
//! five age ranges in months (0-8, 9-12, 13-24, 25-36, 36+). Each cell has
//! three fixed names: the storage column, the spreadsheet header and the
//! display label.

use serde::{Deserialize, Serialize};

/// Animal sex as recorded on the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
}

/// One (sex, age range) count cell
///
/// Declaration order is the canonical order used for storage columns,
/// totals display and lot entry snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Bucket {
    M0To8,
    F0To8,
    M9To12,
    F9To12,
    M13To24,
    F13To24,
    M25To36,
    F25To36,
    M36Plus,
    F36Plus,
}

impl Bucket {
    /// All buckets in canonical order
    pub const ALL: [Bucket; 10] = [
        Bucket::M0To8,
        Bucket::F0To8,
        Bucket::M9To12,
        Bucket::F9To12,
        Bucket::M13To24,
        Bucket::F13To24,
        Bucket::M25To36,
        Bucket::F25To36,
        Bucket::M36Plus,
        Bucket::F36Plus,
    ];

    pub fn sex(self) -> Sex {
        match self {
            Bucket::M0To8 | Bucket::M9To12 | Bucket::M13To24 | Bucket::M25To36 | Bucket::M36Plus => {
                Sex::Male
            }
            _ => Sex::Female,
        }
    }

    /// Column name in the `bovinos` table
    pub fn column(self) -> &'static str {
        match self {
            Bucket::M0To8 => "M_0_8",
            Bucket::F0To8 => "F_0_8",
            Bucket::M9To12 => "M_9_12",
            Bucket::F9To12 => "F_9_12",
            Bucket::M13To24 => "M_13_24",
            Bucket::F13To24 => "F_13_24",
            Bucket::M25To36 => "M_25_36",
            Bucket::F25To36 => "F_25_36",
            Bucket::M36Plus => "M_36_mais",
            Bucket::F36Plus => "F_36_mais",
        }
    }

    /// Header text expected in the imported spreadsheet
    pub fn header(self) -> &'static str {
        match self {
            Bucket::M0To8 => "M 0 - 8",
            Bucket::F0To8 => "F 0 - 8",
            Bucket::M9To12 => "M 9 - 12",
            Bucket::F9To12 => "F 9 - 12",
            Bucket::M13To24 => "M 13 - 24",
            Bucket::F13To24 => "F 13 - 24",
            Bucket::M25To36 => "M 25 - 36",
            Bucket::F25To36 => "F 25 - 36",
            Bucket::M36Plus => "M 36 +",
            Bucket::F36Plus => "F 36 +",
        }
    }

    /// Human-readable label used in totals and lot entries
    pub fn label(self) -> &'static str {
        match self {
            Bucket::M0To8 => "M 0-8",
            Bucket::F0To8 => "F 0-8",
            Bucket::M9To12 => "M 9-12",
            Bucket::F9To12 => "F 9-12",
            Bucket::M13To24 => "M 13-24",
            Bucket::F13To24 => "F 13-24",
            Bucket::M25To36 => "M 25-36",
            Bucket::F25To36 => "F 25-36",
            Bucket::M36Plus => "M 36+",
            Bucket::F36Plus => "F 36+",
        }
    }
}

/// Fixed-shape count per bucket
///
/// Field names serialize as the storage column names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    #[serde(rename = "M_0_8")]
    pub m_0_8: i64,
    #[serde(rename = "F_0_8")]
    pub f_0_8: i64,
    #[serde(rename = "M_9_12")]
    pub m_9_12: i64,
    #[serde(rename = "F_9_12")]
    pub f_9_12: i64,
    #[serde(rename = "M_13_24")]
    pub m_13_24: i64,
    #[serde(rename = "F_13_24")]
    pub f_13_24: i64,
    #[serde(rename = "M_25_36")]
    pub m_25_36: i64,
    #[serde(rename = "F_25_36")]
    pub f_25_36: i64,
    #[serde(rename = "M_36_mais")]
    pub m_36_plus: i64,
    #[serde(rename = "F_36_mais")]
    pub f_36_plus: i64,
}

impl BucketCounts {
    pub fn get(&self, bucket: Bucket) -> i64 {
        match bucket {
            Bucket::M0To8 => self.m_0_8,
            Bucket::F0To8 => self.f_0_8,
            Bucket::M9To12 => self.m_9_12,
            Bucket::F9To12 => self.f_9_12,
            Bucket::M13To24 => self.m_13_24,
            Bucket::F13To24 => self.f_13_24,
            Bucket::M25To36 => self.m_25_36,
            Bucket::F25To36 => self.f_25_36,
            Bucket::M36Plus => self.m_36_plus,
            Bucket::F36Plus => self.f_36_plus,
        }
    }

    pub fn get_mut(&mut self, bucket: Bucket) -> &mut i64 {
        match bucket {
            Bucket::M0To8 => &mut self.m_0_8,
            Bucket::F0To8 => &mut self.f_0_8,
            Bucket::M9To12 => &mut self.m_9_12,
            Bucket::F9To12 => &mut self.f_9_12,
            Bucket::M13To24 => &mut self.m_13_24,
            Bucket::F13To24 => &mut self.f_13_24,
            Bucket::M25To36 => &mut self.m_25_36,
            Bucket::F25To36 => &mut self.f_25_36,
            Bucket::M36Plus => &mut self.m_36_plus,
            Bucket::F36Plus => &mut self.f_36_plus,
        }
    }

    pub fn set(&mut self, bucket: Bucket, count: i64) {
        *self.get_mut(bucket) = count;
    }

    /// Builder-style setter, mostly useful in tests and fixtures
    pub fn with(mut self, bucket: Bucket, count: i64) -> Self {
        self.set(bucket, count);
        self
    }

    /// (bucket, count) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Bucket, i64)> + '_ {
        Bucket::ALL.iter().map(move |&b| (b, self.get(b)))
    }

    /// Buckets whose count is greater than zero, in canonical order
    pub fn nonzero(&self) -> Vec<(Bucket, i64)> {
        self.iter().filter(|&(_, count)| count > 0).collect()
    }

    /// Sum over the buckets of one sex
    pub fn total_for(&self, sex: Sex) -> i64 {
        self.iter()
            .filter(|(b, _)| b.sex() == sex)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn total(&self) -> i64 {
        self.iter().map(|(_, count)| count).sum()
    }

    /// Add every bucket of `other` into `self`
    pub fn accumulate(&mut self, other: &BucketCounts) {
        for bucket in Bucket::ALL {
            *self.get_mut(bucket) += other.get(bucket);
        }
    }
}
