use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::dashboard::{Overview, SharedDashboard};
use crate::feeds::FeedId;
use crate::rotation::{Countdown, RotationState};

/// Read-mostly JSON surface for the kiosk page.
pub fn router(dashboard: SharedDashboard) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/overview", get(overview))
        .route("/api/view", get(view))
        .route("/api/view/toggle", post(toggle))
        .route("/api/countdown", get(countdown))
        .route("/api/feeds/{feed}", get(feed_state))
        .route("/api/feeds/{feed}/metrics", get(feed_metrics))
        .route("/api/feeds/{feed}/live", get(feed_live))
        .route("/api/feeds/{feed}/refresh", post(feed_refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(dashboard)
}

fn parse_feed(raw: &str) -> Result<FeedId, Response> {
    raw.parse::<FeedId>()
        .map_err(|e| (StatusCode::NOT_FOUND, Json(json!({ "error": e }))).into_response())
}

async fn overview(State(d): State<SharedDashboard>) -> Json<Overview> {
    Json(d.overview())
}

async fn view(State(d): State<SharedDashboard>) -> Json<RotationState> {
    Json(d.rotation_state())
}

async fn toggle(State(d): State<SharedDashboard>) -> Json<RotationState> {
    let s = d.request_manual_toggle();
    tracing::info!(target: "api", view = ?s.active_view, "manual toggle");
    Json(s)
}

async fn countdown(State(d): State<SharedDashboard>) -> Json<Countdown> {
    Json(d.countdown())
}

async fn feed_state(State(d): State<SharedDashboard>, Path(feed): Path<String>) -> Response {
    match parse_feed(&feed) {
        Ok(id) => Json(d.feed_state(id)).into_response(),
        Err(resp) => resp,
    }
}

async fn feed_metrics(State(d): State<SharedDashboard>, Path(feed): Path<String>) -> Response {
    match parse_feed(&feed) {
        Ok(id) => Json(d.derived_metrics(id)).into_response(),
        Err(resp) => resp,
    }
}

async fn feed_live(State(d): State<SharedDashboard>, Path(feed): Path<String>) -> Response {
    match parse_feed(&feed) {
        Ok(id) => Json(json!({ "feed": id, "live": d.is_live(id) })).into_response(),
        Err(resp) => resp,
    }
}

/// Runs the cycle inline and reports its outcome. A failed fetch is still
/// a 200: the feed state carrying the error is the answer.
async fn feed_refresh(State(d): State<SharedDashboard>, Path(feed): Path<String>) -> Response {
    let id = match parse_feed(&feed) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let outcome = d.refresh(id).await;
    Json(json!({
        "feed": id,
        "ok": outcome.is_ok(),
        "error": outcome.err().map(|e| e.to_string()),
    }))
    .into_response()
}
