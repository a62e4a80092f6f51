//! Request and response bodies for event endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::PaginationMeta;
use crate::domain::{EventId, EventStatus, EventSummary, Registration};

/// Body of `PATCH /events/{id}/status`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StatusChangeRequest {
    /// Target status.
    pub status: EventStatus,
}

/// Paginated list of public events.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events on this page.
    pub data: Vec<EventSummary>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}

/// Unpaginated list of events for the caller.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventCollectionResponse {
    /// Events.
    pub data: Vec<EventSummary>,
}

/// Registration records of one event, for its organizer.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantListResponse {
    /// Event the records belong to.
    pub event_id: EventId,
    /// Active head count.
    pub participant_count: u64,
    /// Every record, active or not, in commit order.
    pub data: Vec<Registration>,
}
