//! System endpoints: health check, participation modes.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::ParticipationMode;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Participation mode info.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationModeInfo {
    mode: ParticipationMode,
    description: &'static str,
    allows_individuals: bool,
    allows_teams: bool,
}

/// `GET /config/participation-modes` — List participation modes.
#[utoipa::path(
    get,
    path = "/config/participation-modes",
    tag = "System",
    summary = "List participation modes",
    description = "Returns the participation modes an event can be configured with.",
    responses(
        (status = 200, description = "Participation mode catalog", body = Vec<ParticipationModeInfo>),
    )
)]
pub async fn participation_modes_handler() -> impl IntoResponse {
    let modes = [
        (ParticipationMode::Individual, "Each student registers alone"),
        (ParticipationMode::Team, "A leader registers a named team"),
        (ParticipationMode::Both, "Students choose individual or team"),
    ]
    .into_iter()
    .map(|(mode, description)| ParticipationModeInfo {
        mode,
        description,
        allows_individuals: mode != ParticipationMode::Team,
        allows_teams: mode.allows_teams(),
    })
    .collect::<Vec<_>>();
    (StatusCode::OK, Json(modes))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/participation-modes", get(participation_modes_handler))
}
