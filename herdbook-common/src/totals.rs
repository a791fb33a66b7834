//! Totals per bucket and sex over the stored shipments

use crate::bucket::{Bucket, BucketCounts, Sex};
use crate::db::ShipmentRecord;
use serde::Serialize;

/// Sum of every bucket plus derived male/female/overall totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub buckets: BucketCounts,
    pub total_male: i64,
    pub total_female: i64,
    pub total_animals: i64,
}

/// One line of the totals table
#[derive(Debug, Clone, Serialize)]
pub struct TotalsRow {
    pub label: &'static str,
    pub total: i64,
}

impl Totals {
    /// Recompute from scratch over `records`
    pub fn from_records(records: &[ShipmentRecord]) -> Self {
        let mut buckets = BucketCounts::default();
        for record in records {
            buckets.accumulate(&record.buckets);
        }

        let total_male = buckets.total_for(Sex::Male);
        let total_female = buckets.total_for(Sex::Female);

        Self {
            buckets,
            total_male,
            total_female,
            total_animals: total_male + total_female,
        }
    }

    /// Label/total lines in canonical bucket order, for display
    pub fn rows(&self) -> Vec<TotalsRow> {
        Bucket::ALL
            .iter()
            .map(|&b| TotalsRow {
                label: b.label(),
                total: self.buckets.get(b),
            })
            .collect()
    }
}
