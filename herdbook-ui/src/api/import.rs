//! Spreadsheet import
//!
//! Two steps. The upload is validated and kept as a pending preview; nothing
//! is stored until the operator commits that preview. Duplicate seals or
//! permits are reported with the preview and never block the commit.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, post},
    Json, Router,
};
use herdbook_common::db::shipments;
use herdbook_common::import::{self, duplicates::DuplicateReport, ImportRow};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState, PendingImport, MAX_UPLOAD_BYTES};

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview_id: Uuid,
    pub file_name: Option<String>,
    pub rows: Vec<ImportRow>,
    pub duplicates: DuplicateReport,
    pub has_duplicates: bool,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub inserted: u64,
}

#[derive(Debug, Serialize)]
pub struct DiscardResponse {
    pub discarded: Uuid,
}

/// POST /api/import/preview
///
/// Multipart upload with the workbook in the `file` field.
pub async fn preview_import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<PreviewResponse>> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("Upload has no 'file' field".to_string()))?;

    let size = bytes.len();
    let preview = tokio::task::spawn_blocking(move || import::preview(bytes.to_vec()))
        .await
        .map_err(|e| ApiError::Internal(format!("Import task failed: {}", e)))??;

    let preview_id = Uuid::new_v4();
    info!(
        preview_id = %preview_id,
        file = file_name.as_deref().unwrap_or("-"),
        bytes = size,
        rows = preview.rows.len(),
        "Spreadsheet previewed"
    );

    let response = PreviewResponse {
        preview_id,
        file_name: file_name.clone(),
        rows: preview.rows.clone(),
        has_duplicates: !preview.duplicates.is_empty(),
        duplicates: preview.duplicates.clone(),
    };

    state
        .pending_imports
        .write()
        .await
        .insert(preview_id, PendingImport { file_name, preview });

    Ok(Json(response))
}

/// POST /api/import/:id/commit
///
/// Stores every previewed row in file order, in one transaction.
pub async fn commit_import(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CommitResponse>> {
    let pending = state
        .pending_imports
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Import preview {}", id)))?;

    let inserted = match shipments::insert_batch(&state.db, &pending.preview.shipments()).await {
        Ok(inserted) => inserted,
        Err(e) => {
            // Keep the preview so the operator can retry
            state.pending_imports.write().await.insert(id, pending);
            return Err(e.into());
        }
    };

    info!(preview_id = %id, inserted, "Import committed");
    Ok(Json(CommitResponse { inserted }))
}

/// DELETE /api/import/:id
pub async fn discard_import(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DiscardResponse>> {
    state
        .pending_imports
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Import preview {}", id)))?;

    Ok(Json(DiscardResponse { discarded: id }))
}

pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/import/preview",
            post(preview_import).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/import/:id/commit", post(commit_import))
        .route("/api/import/:id", delete(discard_import))
}
