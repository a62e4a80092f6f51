//! Event handlers: public listing and detail, organizer management.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{
    EventListResponse, PaginationParams, ParticipantListResponse, StatusChangeRequest,
};
use crate::api::extract::{CurrentUser, MaybeUser};
use crate::app_state::AppState;
use crate::domain::{
    EventDraft, EventId, EventSummary, RegistrationConfigPatch, count_active_participants,
};
use crate::error::{CampusError, ErrorResponse};

/// `GET /events` — List published events.
///
/// # Errors
///
/// Returns [`CampusError`] on store failures.
#[utoipa::path(
    get,
    path = "/api/v1/events",
    tag = "Events",
    summary = "List published events",
    description = "Returns a paginated list of published events with their active participant counts. Participant records are never included.",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated event list", body = EventListResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, CampusError> {
    let summaries = state.event_service.list_published().await?;
    let (data, pagination) = params.paginate(summaries);
    Ok(Json(EventListResponse { data, pagination }))
}

/// `POST /events` — Create a draft event.
///
/// # Errors
///
/// Returns [`CampusError`] if the caller is not an organizer or the draft
/// is invalid.
#[utoipa::path(
    post,
    path = "/api/v1/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a new event in Draft status owned by the caller. Requires the Organizer or Admin role.",
    request_body = EventDraft,
    params(("x-user-id" = uuid::Uuid, Header, description = "Caller user ID")),
    responses(
        (status = 201, description = "Event created", body = EventSummary),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 401, description = "Unknown caller", body = ErrorResponse),
        (status = 403, description = "Caller is not an organizer", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, CampusError> {
    let summary = state.event_service.create_event(&user, draft).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// `GET /events/{id}` — Event detail.
///
/// # Errors
///
/// Returns [`CampusError::EventNotFound`] if the event does not exist or
/// is not visible to the caller.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}",
    tag = "Events",
    summary = "Get event details",
    description = "Returns a published or completed event. With an x-user-id header the response includes the caller's own registration; the owner and admins can also see drafts.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-user-id" = Option<uuid::Uuid>, Header, description = "Optional caller user ID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventSummary),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CampusError> {
    let summary = state
        .event_service
        .event_detail(EventId::from_uuid(id), viewer.as_ref())
        .await?;
    Ok(Json(summary))
}

/// `PATCH /events/{id}/status` — Change lifecycle status.
///
/// # Errors
///
/// Returns [`CampusError`] for foreign events, disallowed transitions, or
/// unknown events.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}/status",
    tag = "Events",
    summary = "Change event status",
    description = "Moves an event along Draft -> Published -> Completed, or to Cancelled. Completed and Cancelled are terminal.",
    request_body = StatusChangeRequest,
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-user-id" = uuid::Uuid, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "Status changed", body = EventSummary),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Caller does not own the event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 503, description = "Event busy, retry", body = ErrorResponse),
    )
)]
pub async fn change_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<impl IntoResponse, CampusError> {
    let summary = state
        .event_service
        .change_status(&user, EventId::from_uuid(id), req.status)
        .await?;
    Ok(Json(summary))
}

/// `PATCH /events/{id}/registration` — Update registration policy.
///
/// # Errors
///
/// Returns [`CampusError`] for foreign events, invalid values, or unknown
/// events.
#[utoipa::path(
    patch,
    path = "/api/v1/events/{id}/registration",
    tag = "Events",
    summary = "Update registration settings",
    description = "Partially updates isOpen, lastDate, maxParticipants, participationMode, maxTeamMembers and fee. An explicit null clears lastDate or maxParticipants.",
    request_body = RegistrationConfigPatch,
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-user-id" = uuid::Uuid, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "Settings updated", body = EventSummary),
        (status = 400, description = "Invalid settings", body = ErrorResponse),
        (status = 403, description = "Caller does not own the event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 503, description = "Event busy, retry", body = ErrorResponse),
    )
)]
pub async fn update_registration(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
    Json(patch): Json<RegistrationConfigPatch>,
) -> Result<impl IntoResponse, CampusError> {
    let summary = state
        .event_service
        .update_registration_config(&user, EventId::from_uuid(id), &patch)
        .await?;
    Ok(Json(summary))
}

/// `GET /events/{id}/participants` — Full registration records.
///
/// # Errors
///
/// Returns [`CampusError::Forbidden`] unless the caller owns the event or
/// is an admin.
#[utoipa::path(
    get,
    path = "/api/v1/events/{id}/participants",
    tag = "Events",
    summary = "List participants",
    description = "Returns every registration record of the event, team members included. Only the owning organizer and admins may call this.",
    params(
        ("id" = uuid::Uuid, Path, description = "Event UUID"),
        ("x-user-id" = uuid::Uuid, Header, description = "Caller user ID"),
    ),
    responses(
        (status = 200, description = "Registration records", body = ParticipantListResponse),
        (status = 403, description = "Caller does not own the event", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
    )
)]
pub async fn list_participants(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl IntoResponse, CampusError> {
    let event_id = EventId::from_uuid(id);
    let data = state.event_service.participants(&user, event_id).await?;
    Ok(Json(ParticipantListResponse {
        event_id,
        participant_count: count_active_participants(&data),
        data,
    }))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(list_events).post(create_event))
        .route("/events/{id}", get(get_event))
        .route("/events/{id}/status", patch(change_status))
        .route("/events/{id}/registration", patch(update_registration))
        .route("/events/{id}/participants", get(list_participants))
}
