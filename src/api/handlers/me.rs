//! Caller-scoped handlers: own events, own registrations, own profile.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router};

use crate::api::dto::EventCollectionResponse;
use crate::api::extract::{CallerId, CurrentUser};
use crate::app_state::AppState;
use crate::domain::RequestingUser;
use crate::error::{CampusError, ErrorResponse};
use crate::identity::ProfileUpdate;

/// `GET /organizer/events` — Events the caller organizes.
///
/// # Errors
///
/// Returns [`CampusError::Forbidden`] for students.
#[utoipa::path(
    get,
    path = "/api/v1/organizer/events",
    tag = "Me",
    summary = "List my organized events",
    description = "Returns every event the caller owns, in any status.",
    params(("x-user-id" = uuid::Uuid, Header, description = "Caller user ID")),
    responses(
        (status = 200, description = "Owned events", body = EventCollectionResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
        (status = 403, description = "Caller is not an organizer", body = ErrorResponse),
    )
)]
pub async fn organizer_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, CampusError> {
    let data = state.event_service.organizer_events(&user).await?;
    Ok(Json(EventCollectionResponse { data }))
}

/// `GET /me/registrations` — Events the caller is registered for.
///
/// # Errors
///
/// Returns [`CampusError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/me/registrations",
    tag = "Me",
    summary = "List my registrations",
    description = "Returns the events on which the caller holds an active registration, each with a myRegistration block.",
    params(("x-user-id" = uuid::Uuid, Header, description = "Caller user ID")),
    responses(
        (status = 200, description = "Registered events", body = EventCollectionResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
    )
)]
pub async fn my_registrations(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<impl IntoResponse, CampusError> {
    let data = state.event_service.my_registrations(&user).await?;
    Ok(Json(EventCollectionResponse { data }))
}

/// `PUT /users/me` — Create or update the caller's profile.
///
/// # Errors
///
/// Returns [`CampusError::Unauthorized`] without a valid `x-user-id`.
#[utoipa::path(
    put,
    path = "/api/v1/users/me",
    tag = "Me",
    summary = "Upsert my profile",
    description = "Stores the caller's profile used to pre-fill registrations. Existing accounts keep their role; new accounts are students.",
    request_body = ProfileUpdate,
    params(("x-user-id" = uuid::Uuid, Header, description = "Caller user ID")),
    responses(
        (status = 200, description = "Stored profile", body = RequestingUser),
        (status = 401, description = "Missing or malformed caller ID", body = ErrorResponse),
    )
)]
pub async fn upsert_profile(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Json(update): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, CampusError> {
    let user = state.users.upsert_profile(user_id, update).await;
    tracing::info!(%user_id, role = ?user.role, "profile updated");
    Ok(Json(user))
}

/// Caller-scoped routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/organizer/events", get(organizer_events))
        .route("/me/registrations", get(my_registrations))
        .route("/users/me", put(upsert_profile))
}
