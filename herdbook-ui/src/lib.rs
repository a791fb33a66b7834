//! herdbook-ui library - web front end for the herd record book
//!
//! Serves the menu page and the JSON API behind each section: records and
//! totals, spreadsheet import, permit correction, correction history and the
//! lot builder.

use axum::Router;
use herdbook_common::lot::LotSession;
use sessions::{SessionMap, SESSION_TTL};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod sessions;

pub use error::{ApiError, ApiResult};

/// Largest accepted spreadsheet upload
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// A validated spreadsheet waiting for the operator to confirm
#[derive(Debug, Clone)]
pub struct PendingImport {
    pub file_name: Option<String>,
    pub preview: herdbook_common::import::ImportPreview,
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// Lot builder sessions, one per operator
    pub lot_sessions: Arc<RwLock<SessionMap<LotSession>>>,
    /// Import previews keyed by preview id
    pub pending_imports: Arc<RwLock<SessionMap<PendingImport>>>,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self::with_session_ttl(db, SESSION_TTL)
    }

    /// State whose idle sessions and previews expire after `ttl`
    pub fn with_session_ttl(db: SqlitePool, ttl: Duration) -> Self {
        Self {
            db,
            lot_sessions: Arc::new(RwLock::new(SessionMap::new("lot", ttl))),
            pending_imports: Arc::new(RwLock::new(SessionMap::new("import", ttl))),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let pages = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes());

    let records = Router::new()
        .route("/api/records", get(api::list_records))
        .route("/api/records/ids", get(api::list_record_ids))
        .route("/api/records/delete-all", post(api::delete_all_records))
        .route("/api/records/:id/correction", post(api::correct_record_permit))
        .route("/api/corrections", get(api::list_corrections))
        .route("/api/export", get(api::export_spreadsheet));

    Router::new()
        .merge(pages)
        .merge(records)
        .merge(api::import_routes())
        .merge(api::lot_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
