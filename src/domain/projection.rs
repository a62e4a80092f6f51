//! Display-safe projections of events.
//!
//! Raw registration records carry every participant's contact details.
//! Listing and detail responses go through [`project_event_for_listing`]
//! or [`project_event_for_student`] instead, which replace the records
//! with a derived head count.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::event::{Event, EventStatus, RegistrationConfig};
use super::registration::{Registration, RegistrationStatus, RegistrationType};
use super::{EventId, UserId};

/// Sums the head count of every active registration.
///
/// Pure; records with an unusable head count contribute 1.
#[must_use]
pub fn count_active_participants(participants: &[Registration]) -> u64 {
    participants
        .iter()
        .filter(|r| r.is_active())
        .map(|r| u64::from(r.effective_head_count()))
        .sum()
}

/// The caller's own registration, reduced to non-personal fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistration {
    /// Registration status.
    pub status: RegistrationStatus,
    /// Commit timestamp.
    pub registered_at: DateTime<Utc>,
    /// Individual or team.
    pub registration_type: RegistrationType,
    /// Team name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// People covered.
    pub head_count: u32,
}

impl From<&Registration> for MyRegistration {
    fn from(r: &Registration) -> Self {
        Self {
            status: r.status,
            registered_at: r.registered_at,
            registration_type: r.registration_type,
            team_name: r.team_name.clone(),
            head_count: r.effective_head_count(),
        }
    }
}

/// An event as shown in lists and detail views: every field except the
/// participant records, plus the derived `participantCount`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Event identifier.
    pub id: EventId,
    /// Owning organizer.
    pub organizer_id: UserId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Venue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    /// Start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Registration policy.
    pub registration: RegistrationConfig,
    /// Active head count.
    pub participant_count: u64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// The requesting student's registration, on "my events" views only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_registration: Option<MyRegistration>,
}

/// Projects an event for list and detail responses.
#[must_use]
pub fn project_event_for_listing(event: &Event) -> EventSummary {
    EventSummary {
        id: event.id,
        organizer_id: event.organizer_id,
        title: event.title.clone(),
        description: event.description.clone(),
        venue: event.venue.clone(),
        starts_at: event.starts_at,
        status: event.status,
        registration: event.registration.clone(),
        participant_count: count_active_participants(event.participants()),
        created_at: event.created_at,
        updated_at: event.updated_at,
        my_registration: None,
    }
}

/// Projects an event for a student's "my registrations" view, attaching
/// that student's active registration (and nobody else's).
#[must_use]
pub fn project_event_for_student(event: &Event, student_id: UserId) -> EventSummary {
    EventSummary {
        my_registration: event
            .active_registration_of(student_id)
            .map(MyRegistration::from),
        ..project_event_for_listing(event)
    }
}
