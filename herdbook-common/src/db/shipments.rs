//! Shipment manifest queries (`bovinos` table)

use crate::bucket::Bucket;
use crate::db::models::{NewShipment, ShipmentRecord};
use crate::Result;
use sqlx::SqlitePool;
use tracing::{debug, info};

fn select_columns() -> String {
    let buckets: Vec<&str> = Bucket::ALL.iter().map(|b| b.column()).collect();
    format!(
        "id, numero_gta, lacre, {}, lote, proprietario_origem, propriedade_origem",
        buckets.join(", ")
    )
}

fn insert_sql() -> String {
    let buckets: Vec<&str> = Bucket::ALL.iter().map(|b| b.column()).collect();
    // permit, seal, ten buckets, lot, owner, property
    let placeholders = vec!["?"; 15].join(", ");
    format!(
        "INSERT INTO bovinos (numero_gta, lacre, {}, lote, proprietario_origem, propriedade_origem) VALUES ({})",
        buckets.join(", "),
        placeholders
    )
}

/// Insert all rows in order inside one transaction
///
/// Either every row is stored or none is. Returns the number inserted.
pub async fn insert_batch(pool: &SqlitePool, rows: &[NewShipment]) -> Result<u64> {
    let sql = insert_sql();
    let mut tx = pool.begin().await?;

    for row in rows {
        let mut query = sqlx::query(&sql).bind(&row.permit).bind(row.seal);
        for (_, count) in row.buckets.iter() {
            query = query.bind(count);
        }
        query
            .bind(row.lot)
            .bind(&row.origin_owner)
            .bind(&row.origin_property)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    info!(rows = rows.len(), "Inserted shipment batch");
    Ok(rows.len() as u64)
}

/// Every stored shipment, ordered by id
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<ShipmentRecord>> {
    let sql = format!("SELECT {} FROM bovinos ORDER BY id", select_columns());
    let records = sqlx::query_as::<_, ShipmentRecord>(&sql).fetch_all(pool).await?;
    Ok(records)
}

/// Ids of every stored shipment, ascending
pub async fn list_ids(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar("SELECT id FROM bovinos ORDER BY id")
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<ShipmentRecord>> {
    let sql = format!("SELECT {} FROM bovinos WHERE id = ?", select_columns());
    let record = sqlx::query_as::<_, ShipmentRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(record)
}

/// First shipment (lowest id) carrying the given seal
pub async fn find_by_seal(pool: &SqlitePool, seal: i64) -> Result<Option<ShipmentRecord>> {
    let sql = format!(
        "SELECT {} FROM bovinos WHERE lacre = ? ORDER BY id LIMIT 1",
        select_columns()
    );
    let record = sqlx::query_as::<_, ShipmentRecord>(&sql)
        .bind(seal)
        .fetch_optional(pool)
        .await?;

    debug!(seal, found = record.is_some(), "Seal lookup");
    Ok(record)
}

pub async fn count(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar("SELECT COUNT(*) FROM bovinos")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Remove every shipment row, returning how many were removed
///
/// Correction history is left in place. On an empty table this is a no-op.
pub async fn delete_all(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM bovinos").execute(pool).await?;

    let removed = result.rows_affected();
    info!(removed, "Deleted all shipments");
    Ok(removed)
}
