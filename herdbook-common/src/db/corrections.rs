//! Permit correction history (`correcoes_gta` table)
//!
//! Rows are only ever inserted; nothing here updates or deletes them.

use crate::db::models::CorrectionRecord;
use crate::Result;
use sqlx::{SqliteConnection, SqlitePool};

const SELECT_COLUMNS: &str = "id, bovino_id, gta_original, gta_corrigida, motivo, data_correcao";

/// Append one history row on an open connection or transaction
pub async fn insert(
    conn: &mut SqliteConnection,
    shipment_id: i64,
    original_permit: &str,
    corrected_permit: &str,
    reason: &str,
    corrected_at: &str,
) -> Result<CorrectionRecord> {
    let id = sqlx::query(
        r#"
        INSERT INTO correcoes_gta (bovino_id, gta_original, gta_corrigida, motivo, data_correcao)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(shipment_id)
    .bind(original_permit)
    .bind(corrected_permit)
    .bind(reason)
    .bind(corrected_at)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(CorrectionRecord {
        id,
        shipment_id,
        original_permit: original_permit.to_string(),
        corrected_permit: corrected_permit.to_string(),
        reason: Some(reason.to_string()),
        corrected_at: corrected_at.to_string(),
    })
}

/// Full history, newest first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<CorrectionRecord>> {
    let sql = format!(
        "SELECT {} FROM correcoes_gta ORDER BY data_correcao DESC, id DESC",
        SELECT_COLUMNS
    );
    let records = sqlx::query_as::<_, CorrectionRecord>(&sql).fetch_all(pool).await?;
    Ok(records)
}

/// History of one shipment, oldest first
pub async fn list_for_shipment(pool: &SqlitePool, shipment_id: i64) -> Result<Vec<CorrectionRecord>> {
    let sql = format!(
        "SELECT {} FROM correcoes_gta WHERE bovino_id = ? ORDER BY id",
        SELECT_COLUMNS
    );
    let records = sqlx::query_as::<_, CorrectionRecord>(&sql)
        .bind(shipment_id)
        .fetch_all(pool)
        .await?;
    Ok(records)
}
