//! Persistence layer: versioned event documents.
//!
//! Each event is stored whole, together with a version number that grows
//! by one on every successful write. [`EventStore::save`] only succeeds
//! when the caller's expected version still matches, which is what keeps
//! concurrent registrations from overwriting each other.
//!
//! Two implementations are provided: [`memory::InMemoryEventStore`] and
//! [`postgres::PostgresEventStore`] (backed by `sqlx::PgPool`).

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Event, EventId, UserId};

pub use memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;

/// Failures reported by an [`EventStore`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No event with this ID exists.
    #[error("event {0} not found")]
    NotFound(EventId),

    /// An insert collided with an existing event.
    #[error("event {0} already exists")]
    AlreadyExists(EventId),

    /// The stored version moved past the caller's snapshot.
    #[error("event {event_id} changed since version {expected}")]
    Conflict {
        /// Event that was written concurrently.
        event_id: EventId,
        /// Version the caller read.
        expected: u64,
    },

    /// A stored document could not be decoded.
    #[error("stored event {event_id} is corrupt: {reason}")]
    Corrupt {
        /// Affected event.
        event_id: EventId,
        /// Decoder message.
        reason: String,
    },

    /// The backend is unreachable or failed.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// An event together with the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    /// Stored value.
    pub value: T,
    /// Version to pass back to [`EventStore::save`].
    pub version: u64,
}

/// Selection for [`EventStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    /// Every event.
    All,
    /// Events in `Published` status.
    Published,
    /// Events owned by an organizer.
    OrganizedBy(UserId),
    /// Events the student has a registration record on (any status).
    RegisteredBy(UserId),
}

impl EventFilter {
    /// Returns `true` if `event` is selected by this filter.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Self::All => true,
            Self::Published => event.status == crate::domain::EventStatus::Published,
            Self::OrganizedBy(organizer) => event.organizer_id == *organizer,
            Self::RegisteredBy(student) => event
                .participants()
                .iter()
                .any(|r| r.student_id == *student),
        }
    }
}

/// Durable storage for event documents with optimistic concurrency.
#[async_trait]
pub trait EventStore: Send + Sync + std::fmt::Debug {
    /// Stores a new event at version 1.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] on ID collision, or a backend failure.
    async fn insert(&self, event: &Event) -> Result<u64, StoreError>;

    /// Loads an event and its current version.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`], [`StoreError::Corrupt`], or a backend failure.
    async fn load(&self, event_id: EventId) -> Result<Versioned<Event>, StoreError>;

    /// Replaces the stored event if its version is still `expected_version`,
    /// returning the new version.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] if another write happened since the read,
    /// [`StoreError::NotFound`], or a backend failure.
    async fn save(&self, event: &Event, expected_version: u64) -> Result<u64, StoreError>;

    /// Lists events selected by `filter`, oldest first.
    ///
    /// # Errors
    ///
    /// [`StoreError::Corrupt`] or a backend failure.
    async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError>;
}
