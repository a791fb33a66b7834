//! Spreadsheet generation
//!
//! The menu offers this section but it produces nothing yet.

use crate::{ApiError, ApiResult};
use axum::Json;

/// GET /api/export
pub async fn export_spreadsheet() -> ApiResult<Json<()>> {
    Err(ApiError::NotImplemented(
        "Spreadsheet generation is under construction".to_string(),
    ))
}
