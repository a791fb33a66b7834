//! Integration tests for herdbook-ui API endpoints
//!
//! Every test runs against its own in-memory record store.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use herdbook_common::bucket::{Bucket, BucketCounts};
use herdbook_common::db::{create_schema, memory_pool, shipments, NewShipment};
use herdbook_common::import::columns::Field;
use herdbook_common::import::preview_sheet;
use herdbook_common::import::spreadsheet::{Cell, Sheet};
use herdbook_ui::{build_router, AppState, PendingImport};
use serde_json::{json, Value};
use std::time::Duration;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

/// Test helper: empty record store plus router
async fn setup() -> (AppState, Router) {
    let pool = memory_pool().await.expect("Should open in-memory database");
    create_schema(&pool).await.expect("Should create schema");

    let state = AppState::new(pool);
    let app = build_router(state.clone());
    (state, app)
}

/// Test helper: like [`setup`] but every idle session is already stale
async fn setup_expiring() -> (AppState, Router) {
    let pool = memory_pool().await.expect("Should open in-memory database");
    create_schema(&pool).await.expect("Should create schema");

    let state = AppState::with_session_ttl(pool, Duration::ZERO);
    let app = build_router(state.clone());
    (state, app)
}

async fn seed(state: &AppState, rows: &[NewShipment]) {
    shipments::insert_batch(&state.db, rows).await.expect("Should insert rows");
}

fn manifest(permit: &str, seal: i64, buckets: BucketCounts) -> NewShipment {
    let mut shipment = NewShipment::new(permit, Some(seal));
    shipment.buckets = buckets;
    shipment.origin_owner = Some("João Silva".to_string());
    shipment
}

fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(field: &str, content: &[u8]) -> Request<Body> {
    let boundary = "herdbook-test-boundary";
    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"; filename=\"manifest.xlsx\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        b = boundary,
        f = field
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/import/preview")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}

/// Test helper: send one request, return status and JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Pages and service info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_, app) = setup().await;

    let (status, body) = send(&app, test_request("GET", "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "herdbook-ui");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let (_, app) = setup().await;

    let (status, body) = send(&app, test_request("GET", "/api/buildinfo")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_menu_page_and_script_are_served() {
    let (_, app) = setup().await;

    let response = app.clone().oneshot(test_request("GET", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Build lot"));
    assert!(html.contains("Generate spreadsheet"));

    let response = app.oneshot(test_request("GET", "/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/javascript"
    );
}

// =============================================================================
// Records and totals
// =============================================================================

#[tokio::test]
async fn test_records_on_empty_store() {
    let (_, app) = setup().await;

    let (status, body) = send(&app, test_request("GET", "/api/records")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rows"].as_array().unwrap().len(), 0);
    assert_eq!(body["totals"]["total_animals"], 0);
    assert_eq!(body["totals_table"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_records_with_totals() {
    let (state, app) = setup().await;
    seed(
        &state,
        &[
            manifest("A100", 1, BucketCounts::default().with(Bucket::M0To8, 2).with(Bucket::F9To12, 1)),
            manifest("A101", 2, BucketCounts::default().with(Bucket::M36Plus, 5).with(Bucket::F36Plus, 3)),
        ],
    )
    .await;

    let (status, body) = send(&app, test_request("GET", "/api/records")).await;
    assert_eq!(status, StatusCode::OK);

    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["permit"], "A100");
    assert_eq!(rows[0]["buckets"]["M_0_8"], 2);

    let totals = &body["totals"];
    assert_eq!(totals["total_male"], 7);
    assert_eq!(totals["total_female"], 4);
    assert_eq!(totals["total_animals"], 11);
    assert_eq!(totals["buckets"]["F_36_mais"], 3);

    let (_, ids) = send(&app, test_request("GET", "/api/records/ids")).await;
    assert_eq!(ids.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_delete_all_requires_confirmation() {
    let (state, app) = setup().await;
    seed(&state, &[manifest("A100", 1, BucketCounts::default())]).await;

    let (status, body) = send(&app, json_request("POST", "/api/records/delete-all", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(shipments::count(&state.db).await.unwrap(), 1);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/records/delete-all", json!({ "confirm": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 1);

    // Second run is a no-op, not an error
    let (status, body) = send(
        &app,
        json_request("POST", "/api/records/delete-all", json!({ "confirm": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 0);
    assert_eq!(shipments::count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_export_is_placeholder() {
    let (_, app) = setup().await;

    let (status, body) = send(&app, test_request("GET", "/api/export")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body["error"]["code"], "NOT_IMPLEMENTED");
    assert!(body["error"]["message"].as_str().unwrap().contains("under construction"));
}

// =============================================================================
// Permit correction
// =============================================================================

#[tokio::test]
async fn test_correction_and_history() {
    let (state, app) = setup().await;
    seed(&state, &[manifest("A100", 1, BucketCounts::default())]).await;
    let id = shipments::list_ids(&state.db).await.unwrap()[0];

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/records/{}/correction", id),
            json!({ "new_permit": "A200", "reason": "digitação" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["original_permit"], "A100");
    assert_eq!(body["corrected_permit"], "A200");

    let (_, records) = send(&app, test_request("GET", "/api/records")).await;
    assert_eq!(records["rows"][0]["permit"], "A200");

    let (status, history) = send(&app, test_request("GET", "/api/corrections")).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["shipment_id"], id);
    assert_eq!(history[0]["reason"], "digitação");
}

#[tokio::test]
async fn test_correction_of_unknown_record() {
    let (_, app) = setup().await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/records/42/correction", json!({ "new_permit": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (_, history) = send(&app, test_request("GET", "/api/corrections")).await;
    assert!(history.as_array().unwrap().is_empty());
}

// =============================================================================
// Import
// =============================================================================

fn preview_with_duplicate_seal() -> PendingImport {
    let headers = Field::all().iter().map(|f| f.header().to_string()).collect();
    let row = |permit: &str, seal: i64, m_0_8: i64| {
        let mut cells = vec![Cell::Text(permit.to_string()), Cell::Int(seal), Cell::Int(m_0_8)];
        cells.extend(std::iter::repeat(Cell::Empty).take(12));
        cells
    };
    let sheet = Sheet {
        headers,
        rows: vec![row("A1", 123, 2), row("A2", 456, 1), row("A3", 123, 4)],
        header_row: 1,
    };

    PendingImport {
        file_name: Some("manifest.xlsx".to_string()),
        preview: preview_sheet(&sheet).unwrap(),
    }
}

#[tokio::test]
async fn test_unreadable_upload_is_rejected() {
    let (state, app) = setup().await;

    let (status, body) = send(&app, upload_request("file", b"not a spreadsheet")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SPREADSHEET_ERROR");
    assert!(state.pending_imports.read().await.is_empty());
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (_, app) = setup().await;

    let (status, body) = send(&app, upload_request("other", b"whatever")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["message"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn test_commit_stores_preview_despite_duplicates() {
    let (state, app) = setup().await;
    let pending = preview_with_duplicate_seal();
    assert!(!pending.preview.duplicates.is_empty());

    let id = Uuid::new_v4();
    state.pending_imports.write().await.insert(id, pending);

    let (status, body) = send(&app, test_request("POST", &format!("/api/import/{}/commit", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 3);

    let stored = shipments::list_all(&state.db).await.unwrap();
    let permits: Vec<&str> = stored.iter().map(|r| r.permit.as_str()).collect();
    assert_eq!(permits, vec!["A1", "A2", "A3"]);

    // A preview can only be committed once
    let (status, _) = send(&app, test_request("POST", &format!("/api/import/{}/commit", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_discard_preview() {
    let (state, app) = setup().await;
    let id = Uuid::new_v4();
    state
        .pending_imports
        .write()
        .await
        .insert(id, preview_with_duplicate_seal());

    let (status, body) = send(&app, test_request("DELETE", &format!("/api/import/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["discarded"], id.to_string());

    let (status, _) = send(&app, test_request("POST", &format!("/api/import/{}/commit", id))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(shipments::count(&state.db).await.unwrap(), 0);
}

// =============================================================================
// Lot builder
// =============================================================================

async fn open_lot(app: &Router) -> String {
    let (status, body) = send(app, test_request("POST", "/api/lots")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "idle");
    body["session_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_lot_builder_flow() {
    let (state, app) = setup().await;
    seed(
        &state,
        &[manifest("A100", 123, BucketCounts::default().with(Bucket::M0To8, 2).with(Bucket::F9To12, 1))],
    )
    .await;

    let session = open_lot(&app).await;

    let (status, body) = send(&app, test_request("POST", &format!("/api/lots/{}/start", session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "naming");
    assert_eq!(body["discarded"]["entries"], 0);

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/lots/{}/name", session), json!({ "label": "L1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "searching");
    assert_eq!(body["draft"]["label"], "L1");

    // Miss: 404 and nothing changes
    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/lots/{}/search", session), json!({ "seal": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "SEAL_NOT_FOUND");

    let (_, body) = send(&app, test_request("GET", &format!("/api/lots/{}", session))).await;
    assert_eq!(body["state"], "searching");
    assert_eq!(body["draft"]["entries"].as_array().unwrap().len(), 0);

    // Hit
    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/lots/{}/search", session), json!({ "seal": 123 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "reviewing");
    assert_eq!(body["found"]["permit"], "A100");

    let (status, body) = send(&app, test_request("POST", &format!("/api/lots/{}/append", session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "searching");

    let entries = body["draft"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0]["buckets"],
        json!([
            { "bucket": "M 0-8", "count": 2 },
            { "bucket": "F 9-12", "count": 1 }
        ])
    );
    assert_eq!(body["totals"]["M_0_8"], 2);

    // Starting over reports the discarded draft
    let (_, body) = send(&app, test_request("POST", &format!("/api/lots/{}/start", session))).await;
    assert_eq!(body["discarded"]["label"], "L1");
    assert_eq!(body["discarded"]["entries"], 1);
    assert!(body["draft"].is_null());
}

#[tokio::test]
async fn test_lot_wrong_state_is_conflict() {
    let (_, app) = setup().await;
    let session = open_lot(&app).await;

    let (status, body) = send(&app, test_request("POST", &format!("/api/lots/{}/append", session))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_lot_blank_label() {
    let (_, app) = setup().await;
    let session = open_lot(&app).await;
    send(&app, test_request("POST", &format!("/api/lots/{}/start", session))).await;

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/lots/{}/name", session), json!({ "label": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "EMPTY_LABEL");
}

#[tokio::test]
async fn test_unknown_lot_session() {
    let (_, app) = setup().await;

    let (status, _) = send(&app, test_request("GET", &format!("/api/lots/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_before_naming_is_conflict() {
    let (state, app) = setup().await;
    seed(&state, &[manifest("A100", 123, BucketCounts::default())]).await;
    let session = open_lot(&app).await;

    let (status, body) = send(
        &app,
        json_request("POST", &format!("/api/lots/{}/search", session), json!({ "seal": 123 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (_, body) = send(&app, test_request("GET", &format!("/api/lots/{}", session))).await;
    assert_eq!(body["state"], "idle");
    assert!(body["pending"].is_null());
}

#[tokio::test]
async fn test_close_lot_session() {
    let (state, app) = setup().await;
    let session = open_lot(&app).await;

    let (status, body) = send(&app, test_request("DELETE", &format!("/api/lots/{}", session))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["closed"], session);
    assert!(state.lot_sessions.read().await.is_empty());

    let (status, _) = send(&app, test_request("DELETE", &format!("/api/lots/{}", session))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_idle_lot_sessions_expire() {
    let (state, app) = setup_expiring().await;

    let first = open_lot(&app).await;
    let second = open_lot(&app).await;
    assert_eq!(state.lot_sessions.read().await.len(), 1);

    let (status, _) = send(&app, test_request("GET", &format!("/api/lots/{}", first))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, test_request("GET", &format!("/api/lots/{}", second))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_idle_import_previews_expire() {
    let (state, app) = setup_expiring().await;
    let (stale, fresh) = (Uuid::new_v4(), Uuid::new_v4());

    state.pending_imports.write().await.insert(stale, preview_with_duplicate_seal());
    let evicted = state
        .pending_imports
        .write()
        .await
        .insert(fresh, preview_with_duplicate_seal());
    assert_eq!(evicted, 1);

    let (status, _) = send(&app, test_request("POST", &format!("/api/import/{}/commit", stale))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = send(&app, test_request("POST", &format!("/api/import/{}/commit", fresh))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted"], 3);
}
