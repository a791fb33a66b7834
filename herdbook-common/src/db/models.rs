//! Database models

use crate::bucket::{Bucket, BucketCounts};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// A shipment manifest row ready to be stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewShipment {
    /// Transport permit (GTA) number
    pub permit: String,
    /// Seal (lacre) number
    pub seal: Option<i64>,
    pub buckets: BucketCounts,
    pub lot: Option<i64>,
    pub origin_owner: Option<String>,
    pub origin_property: Option<String>,
}

impl NewShipment {
    pub fn new(permit: impl Into<String>, seal: Option<i64>) -> Self {
        Self {
            permit: permit.into(),
            seal,
            buckets: BucketCounts::default(),
            lot: None,
            origin_owner: None,
            origin_property: None,
        }
    }
}

/// A stored shipment manifest (`bovinos` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentRecord {
    pub id: i64,
    pub permit: String,
    pub seal: Option<i64>,
    pub buckets: BucketCounts,
    pub lot: Option<i64>,
    pub origin_owner: Option<String>,
    pub origin_property: Option<String>,
}

impl<'r> FromRow<'r, SqliteRow> for ShipmentRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let mut buckets = BucketCounts::default();
        for bucket in Bucket::ALL {
            // NULL counts come from files written before counts were validated
            let count: Option<i64> = row.try_get(bucket.column())?;
            buckets.set(bucket, count.unwrap_or(0));
        }

        Ok(Self {
            id: row.try_get("id")?,
            permit: row.try_get("numero_gta")?,
            seal: row.try_get("lacre")?,
            buckets,
            lot: row.try_get("lote")?,
            origin_owner: row.try_get("proprietario_origem")?,
            origin_property: row.try_get("propriedade_origem")?,
        })
    }
}

/// One permit correction (`correcoes_gta` row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: i64,
    pub shipment_id: i64,
    pub original_permit: String,
    pub corrected_permit: String,
    pub reason: Option<String>,
    /// RFC 3339 UTC timestamp
    pub corrected_at: String,
}

impl<'r> FromRow<'r, SqliteRow> for CorrectionRecord {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            shipment_id: row.try_get("bovino_id")?,
            original_permit: row.try_get("gta_original")?,
            corrected_permit: row.try_get("gta_corrigida")?,
            reason: row.try_get("motivo")?,
            corrected_at: row.try_get("data_correcao")?,
        })
    }
}
