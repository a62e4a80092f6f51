//! Live-feed events reflecting event and registration changes.
//!
//! Every state change of a public event emits a [`FeedEvent`] through
//! the [`super::FeedBus`]. Feed events are broadcast to WebSocket
//! subscribers and never carry personal data: identifiers and counts only.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::event::{EventStatus, ParticipationMode};
use super::registration::RegistrationType;
use super::EventId;

/// Notification emitted after every committed state change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum FeedEvent {
    /// A draft was published and is now publicly visible.
    EventPublished {
        /// Event identifier.
        event_id: EventId,
        /// Event title.
        title: String,
        /// Publication timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A public event moved to a new lifecycle status.
    EventStatusChanged {
        /// Event identifier.
        event_id: EventId,
        /// Status before the change.
        old_status: EventStatus,
        /// Status after the change.
        new_status: EventStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The organizer changed the registration policy.
    RegistrationConfigUpdated {
        /// Event identifier.
        event_id: EventId,
        /// Whether registration is open after the change.
        is_open: bool,
        /// Participation mode after the change.
        participation_mode: ParticipationMode,
        /// Head-count cap after the change.
        max_participants: Option<u32>,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A registration was committed.
    RegistrationCommitted {
        /// Event identifier.
        event_id: EventId,
        /// Individual or team.
        registration_type: RegistrationType,
        /// People covered by the new registration.
        head_count: u32,
        /// Active head count after the commit.
        participant_count: u64,
        /// Places left, if the event is capped.
        remaining_capacity: Option<u64>,
        /// Commit timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl FeedEvent {
    /// Returns the event ID this notification is about.
    #[must_use]
    pub fn event_id(&self) -> EventId {
        match self {
            Self::EventPublished { event_id, .. }
            | Self::EventStatusChanged { event_id, .. }
            | Self::RegistrationConfigUpdated { event_id, .. }
            | Self::RegistrationCommitted { event_id, .. } => *event_id,
        }
    }

    /// Returns the feed event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::EventPublished { .. } => "event_published",
            Self::EventStatusChanged { .. } => "event_status_changed",
            Self::RegistrationConfigUpdated { .. } => "registration_config_updated",
            Self::RegistrationCommitted { .. } => "registration_committed",
        }
    }
}
