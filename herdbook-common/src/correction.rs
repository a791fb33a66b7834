//! Permit correction workflow
//!
//! Replaces the permit number of one shipment and records the change in
//! the correction history. Both writes share one transaction: if the history
//! insert fails, the permit update is rolled back with it.

use crate::db::{corrections, CorrectionRecord};
use crate::{Error, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

/// Operator input for one correction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub shipment_id: i64,
    pub new_permit: String,
    pub reason: String,
}

/// Apply a permit correction and append it to the history
///
/// Neither the permit nor the reason is format-checked. An unknown
/// shipment id yields [`Error::NotFound`] and writes nothing.
pub async fn correct_permit(pool: &SqlitePool, request: &CorrectionRequest) -> Result<CorrectionRecord> {
    let mut tx = pool.begin().await?;

    let original: Option<String> = sqlx::query_scalar("SELECT numero_gta FROM bovinos WHERE id = ?")
        .bind(request.shipment_id)
        .fetch_optional(&mut *tx)
        .await?;

    let original = original
        .ok_or_else(|| Error::NotFound(format!("Shipment {} does not exist", request.shipment_id)))?;

    sqlx::query("UPDATE bovinos SET numero_gta = ? WHERE id = ?")
        .bind(&request.new_permit)
        .bind(request.shipment_id)
        .execute(&mut *tx)
        .await?;

    let corrected_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false);
    let record = corrections::insert(
        &mut *tx,
        request.shipment_id,
        &original,
        &request.new_permit,
        &request.reason,
        &corrected_at,
    )
    .await?;

    tx.commit().await?;

    info!(
        shipment_id = request.shipment_id,
        from = %original,
        to = %request.new_permit,
        "Permit corrected"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_schema, memory_pool, shipments, NewShipment};

    async fn setup_with(permit: &str) -> (SqlitePool, i64) {
        let pool = memory_pool().await.unwrap();
        create_schema(&pool).await.unwrap();
        shipments::insert_batch(&pool, &[NewShipment::new(permit, Some(10))])
            .await
            .unwrap();
        let id = shipments::list_ids(&pool).await.unwrap()[0];
        (pool, id)
    }

    #[tokio::test]
    async fn test_correction_updates_permit_and_appends_history() {
        let (pool, id) = setup_with("A100").await;

        let request = CorrectionRequest {
            shipment_id: id,
            new_permit: "A200".to_string(),
            reason: "digitação".to_string(),
        };
        let record = correct_permit(&pool, &request).await.unwrap();

        assert_eq!(record.original_permit, "A100");
        assert_eq!(record.corrected_permit, "A200");

        let shipment = shipments::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(shipment.permit, "A200");

        let history = corrections::list_all(&pool).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].shipment_id, id);
        assert_eq!(history[0].original_permit, "A100");
        assert_eq!(history[0].corrected_permit, "A200");
        assert_eq!(history[0].reason.as_deref(), Some("digitação"));
        assert!(chrono::DateTime::parse_from_rfc3339(&history[0].corrected_at).is_ok());
    }

    #[tokio::test]
    async fn test_second_correction_records_previous_value() {
        let (pool, id) = setup_with("A100").await;

        for permit in ["A200", "A300"] {
            let request = CorrectionRequest {
                shipment_id: id,
                new_permit: permit.to_string(),
                reason: String::new(),
            };
            correct_permit(&pool, &request).await.unwrap();
        }

        let history = corrections::list_for_shipment(&pool, id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].original_permit, "A200");
        assert_eq!(history[1].corrected_permit, "A300");
    }

    #[tokio::test]
    async fn test_unknown_shipment_writes_nothing() {
        let (pool, _) = setup_with("A100").await;

        let request = CorrectionRequest {
            shipment_id: 9999,
            new_permit: "Z".to_string(),
            reason: "none".to_string(),
        };
        let err = correct_permit(&pool, &request).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        assert!(corrections::list_all(&pool).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_history_insert_rolls_back_update() {
        let (pool, id) = setup_with("A100").await;

        sqlx::query("DROP TABLE correcoes_gta").execute(&pool).await.unwrap();

        let request = CorrectionRequest {
            shipment_id: id,
            new_permit: "A200".to_string(),
            reason: "x".to_string(),
        };
        assert!(correct_permit(&pool, &request).await.is_err());

        let shipment = shipments::find_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(shipment.permit, "A100");
    }
}
