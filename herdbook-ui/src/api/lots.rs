//! Lot builder sessions
//!
//! A client opens a session with `POST /api/lots` and drives it with the
//! returned id. Every response carries the full session so the page can
//! redraw the draft after each step.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use herdbook_common::bucket::BucketCounts;
use herdbook_common::db::shipments;
use herdbook_common::lot::{Discarded, LotEntry, LotSession};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub session: LotSession,
    /// Bucket sums over the draft's entries
    pub totals: Option<BucketCounts>,
}

impl SessionResponse {
    fn new(session_id: Uuid, session: &LotSession) -> Self {
        Self {
            session_id,
            totals: session.draft().map(|d| d.totals()),
            session: session.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StartResponse {
    pub discarded: Discarded,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub found: LotEntry,
    #[serde(flatten)]
    pub session: SessionResponse,
}

#[derive(Debug, Serialize)]
pub struct CloseResponse {
    pub closed: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub label: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub seal: i64,
}

fn unknown_session(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Lot session {}", id))
}

/// POST /api/lots
pub async fn create_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let id = Uuid::new_v4();
    let session = LotSession::new();
    let response = SessionResponse::new(id, &session);

    state.lot_sessions.write().await.insert(id, session);
    debug!(session_id = %id, "Lot session opened");

    Json(response)
}

/// GET /api/lots/:session
pub async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<SessionResponse>> {
    let sessions = state.lot_sessions.read().await;
    let session = sessions.get(&id).ok_or_else(|| unknown_session(id))?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// POST /api/lots/:session/start
///
/// Throws away the current draft without asking and reports what was lost.
pub async fn start_lot(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<StartResponse>> {
    let mut sessions = state.lot_sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;

    let discarded = session.start_new_lot();
    Ok(Json(StartResponse {
        discarded,
        session: SessionResponse::new(id, session),
    }))
}

/// POST /api/lots/:session/name
pub async fn name_lot(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<NameRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let mut sessions = state.lot_sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;

    session.name_lot(&request.label)?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// POST /api/lots/:session/search
///
/// A miss answers 404 and leaves the session untouched.
pub async fn search_seal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    // No lock is held while the store is queried
    {
        let sessions = state.lot_sessions.read().await;
        let session = sessions.get(&id).ok_or_else(|| unknown_session(id))?;
        session.ensure_can_search()?;
    }

    let found = shipments::find_by_seal(&state.db, request.seal).await?;

    let mut sessions = state.lot_sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;
    let found = session.apply_lookup(request.seal, found)?.clone();

    Ok(Json(SearchResponse {
        found,
        session: SessionResponse::new(id, session),
    }))
}

/// POST /api/lots/:session/append
pub async fn append_entry(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<SessionResponse>> {
    let mut sessions = state.lot_sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(|| unknown_session(id))?;

    session.confirm_append()?;
    Ok(Json(SessionResponse::new(id, session)))
}

/// DELETE /api/lots/:session
pub async fn close_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<CloseResponse>> {
    state
        .lot_sessions
        .write()
        .await
        .remove(&id)
        .ok_or_else(|| unknown_session(id))?;

    debug!(session_id = %id, "Lot session closed");
    Ok(Json(CloseResponse { closed: id }))
}

pub fn lot_routes() -> Router<AppState> {
    Router::new()
        .route("/api/lots", post(create_session))
        .route("/api/lots/:session", get(get_session).delete(close_session))
        .route("/api/lots/:session/start", post(start_lot))
        .route("/api/lots/:session/name", post(name_lot))
        .route("/api/lots/:session/search", post(search_seal))
        .route("/api/lots/:session/append", post(append_entry))
}
