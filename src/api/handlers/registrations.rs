//! Registration handler.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::RegistrationReceipt;
use crate::api::extract::CurrentUser;
use crate::app_state::AppState;
use crate::domain::{EventId, RegistrationRejection, RegistrationRequest};
use crate::error::{CampusError, ErrorResponse};

/// Decodes the raw body. An empty body counts as an empty object.
fn parse_body(body: &[u8]) -> Result<serde_json::Value, CampusError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::Value::Object(serde_json::Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| {
        CampusError::Rejected(RegistrationRejection::InvalidProfile(format!(
            "Malformed registration payload: {e}"
        )))
    })
}

/// `POST /events/{id}/registrations` — Register for an event.
///
/// # Errors
///
/// Returns [`CampusError::Rejected`] with the first failing registration
/// rule, [`CampusError::Busy`] when concurrent writes outlast the retry
/// budget, or [`CampusError::EventNotFound`].
#[utoipa::path(
    post,
    path = "/api/v1/events/{id}/registrations",
    tag = "Registrations",
    summary = "Register for an event",
    description = "Registers the caller individually or as the leader of a team. participantProfile, declarations and teamMembers may be nested JSON or JSON-encoded strings. Missing profile fields are filled from the caller's account.",
    request_body = RegistrationRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-user-id" = uuid::Uuid, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 201, description = "Registration committed", body = RegistrationReceipt),
        (status = 400, description = "Registration rule failed", body = ErrorResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
        (status = 403, description = "Registration not possible for this event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 503, description = "Event busy, retry", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    body: Bytes,
) -> Result<impl IntoResponse, CampusError> {
    let payload = parse_body(&body)?;
    let outcome = state
        .event_service
        .register(&user, EventId::from_uuid(id), payload)
        .await?;
    Ok((StatusCode::CREATED, Json(RegistrationReceipt::from(outcome))))
}

/// Registration routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events/{id}/registrations", post(register))
}
