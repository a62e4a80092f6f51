//! Database row model for the `events` table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{StoreError, Versioned};
use crate::domain::{Event, EventId};

/// A row from the `events` table.
///
/// The full [`Event`] lives in `document`; `organizer_id` and `status`
/// are copied out so list queries can filter without decoding JSON.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    /// Event ID.
    pub id: Uuid,
    /// Owning organizer.
    pub organizer_id: Uuid,
    /// Status name as serialized by [`crate::domain::EventStatus`].
    pub status: String,
    /// Complete event document, participants included.
    pub document: serde_json::Value,
    /// Optimistic concurrency version.
    pub version: i64,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last write timestamp.
    pub updated_at: DateTime<Utc>,
}

impl EventRow {
    /// Decodes the stored document.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] if the document does not decode or
    /// the version is negative.
    pub fn into_versioned(self) -> Result<Versioned<Event>, StoreError> {
        let event_id = EventId::from_uuid(self.id);
        let value: Event =
            serde_json::from_value(self.document).map_err(|e| StoreError::Corrupt {
                event_id,
                reason: e.to_string(),
            })?;
        let version = u64::try_from(self.version).map_err(|_| StoreError::Corrupt {
            event_id,
            reason: format!("negative version {}", self.version),
        })?;
        Ok(Versioned { value, version })
    }
}
