//! Permit correction and its history

use axum::{
    extract::{Path, State},
    Json,
};
use herdbook_common::correction::{correct_permit, CorrectionRequest};
use herdbook_common::db::{corrections, CorrectionRecord};
use serde::Deserialize;

use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct CorrectionBody {
    pub new_permit: String,
    #[serde(default)]
    pub reason: String,
}

/// POST /api/records/:id/correction
pub async fn correct_record_permit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CorrectionBody>,
) -> ApiResult<Json<CorrectionRecord>> {
    let request = CorrectionRequest {
        shipment_id: id,
        new_permit: body.new_permit,
        reason: body.reason,
    };

    Ok(Json(correct_permit(&state.db, &request).await?))
}

/// GET /api/corrections
///
/// Full history, newest first
pub async fn list_corrections(State(state): State<AppState>) -> ApiResult<Json<Vec<CorrectionRecord>>> {
    Ok(Json(corrections::list_all(&state.db).await?))
}
