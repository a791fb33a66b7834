//! Stored shipments and their totals

use axum::{extract::State, Json};
use herdbook_common::db::{shipments, ShipmentRecord};
use herdbook_common::totals::{Totals, TotalsRow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct RecordsResponse {
    pub rows: Vec<ShipmentRecord>,
    pub totals: Totals,
    /// Per-bucket totals as label/total lines, in canonical order
    pub totals_table: Vec<TotalsRow>,
}

/// GET /api/records
///
/// Every stored shipment plus totals recomputed over all of them.
pub async fn list_records(State(state): State<AppState>) -> ApiResult<Json<RecordsResponse>> {
    let rows = shipments::list_all(&state.db).await?;
    let totals = Totals::from_records(&rows);

    Ok(Json(RecordsResponse {
        totals_table: totals.rows(),
        rows,
        totals,
    }))
}

/// GET /api/records/ids
///
/// Choices for the correction form.
pub async fn list_record_ids(State(state): State<AppState>) -> ApiResult<Json<Vec<i64>>> {
    Ok(Json(shipments::list_ids(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct DeleteAllRequest {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Serialize)]
pub struct DeleteAllResponse {
    pub removed: u64,
}

/// POST /api/records/delete-all
///
/// Refused unless the request carries `"confirm": true`. Cannot be undone.
pub async fn delete_all_records(
    State(state): State<AppState>,
    Json(request): Json<DeleteAllRequest>,
) -> ApiResult<Json<DeleteAllResponse>> {
    if !request.confirm {
        return Err(ApiError::BadRequest(
            "Deleting every record requires confirmation".to_string(),
        ));
    }

    let removed = shipments::delete_all(&state.db).await?;
    warn!(removed, "All shipment records deleted by operator");

    Ok(Json(DeleteAllResponse { removed }))
}
