//! PostgreSQL implementation of the persistence layer.

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::EventRow;
use super::{EventFilter, EventStore, StoreError, Versioned};
use crate::domain::{Event, EventId, EventStatus};

const SELECT_COLUMNS: &str =
    "SELECT id, organizer_id, status, document, version, created_at, updated_at FROM events";

/// PostgreSQL-backed event store using `sqlx::PgPool`.
///
/// Each event is one row; the document column holds the whole aggregate.
/// Saves are conditional on the `version` column, so two writers that read
/// the same version cannot both succeed.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: PgPool,
}

impl PostgresEventStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.to_string())
}

fn encode(event: &Event) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(event).map_err(|e| StoreError::Corrupt {
        event_id: event.id,
        reason: e.to_string(),
    })
}

fn to_db_version(event_id: EventId, version: u64) -> Result<i64, StoreError> {
    i64::try_from(version).map_err(|_| StoreError::Conflict {
        event_id,
        expected: version,
    })
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, event: &Event) -> Result<u64, StoreError> {
        let document = encode(event)?;
        let result = sqlx::query(
            "INSERT INTO events (id, organizer_id, status, document, version, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, 1, $5, $6) ON CONFLICT (id) DO NOTHING",
        )
        .bind(*event.id.as_uuid())
        .bind(*event.organizer_id.as_uuid())
        .bind(event.status.as_str())
        .bind(&document)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(event.id));
        }
        Ok(1)
    }

    async fn load(&self, event_id: EventId) -> Result<Versioned<Event>, StoreError> {
        let query = format!("{SELECT_COLUMNS} WHERE id = $1");
        let row = sqlx::query_as::<_, EventRow>(&query)
            .bind(*event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?
            .ok_or(StoreError::NotFound(event_id))?;

        row.into_versioned()
    }

    async fn save(&self, event: &Event, expected_version: u64) -> Result<u64, StoreError> {
        let document = encode(event)?;
        let expected = to_db_version(event.id, expected_version)?;

        let updated = sqlx::query_scalar::<_, i64>(
            "UPDATE events SET status = $3, document = $4, version = version + 1, updated_at = $5 \
             WHERE id = $1 AND version = $2 RETURNING version",
        )
        .bind(*event.id.as_uuid())
        .bind(expected)
        .bind(event.status.as_str())
        .bind(&document)
        .bind(event.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;

        if let Some(version) = updated {
            return u64::try_from(version).map_err(|_| StoreError::Corrupt {
                event_id: event.id,
                reason: format!("negative version {version}"),
            });
        }

        // Zero rows: either the event is gone or someone else wrote first.
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM events WHERE id = $1)")
            .bind(*event.id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;

        if exists {
            Err(StoreError::Conflict {
                event_id: event.id,
                expected: expected_version,
            })
        } else {
            Err(StoreError::NotFound(event.id))
        }
    }

    async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let rows = match filter {
            EventFilter::All => {
                let query = format!("{SELECT_COLUMNS} ORDER BY created_at ASC");
                sqlx::query_as::<_, EventRow>(&query)
                    .fetch_all(&self.pool)
                    .await
            }
            EventFilter::Published => {
                let query = format!("{SELECT_COLUMNS} WHERE status = $1 ORDER BY created_at ASC");
                sqlx::query_as::<_, EventRow>(&query)
                    .bind(EventStatus::Published.as_str())
                    .fetch_all(&self.pool)
                    .await
            }
            EventFilter::OrganizedBy(organizer) => {
                let query =
                    format!("{SELECT_COLUMNS} WHERE organizer_id = $1 ORDER BY created_at ASC");
                sqlx::query_as::<_, EventRow>(&query)
                    .bind(*organizer.as_uuid())
                    .fetch_all(&self.pool)
                    .await
            }
            EventFilter::RegisteredBy(student) => {
                let query = format!(
                    "{SELECT_COLUMNS} WHERE document -> 'participants' @> \
                     jsonb_build_array(jsonb_build_object('studentId', $1::text)) \
                     ORDER BY created_at ASC"
                );
                sqlx::query_as::<_, EventRow>(&query)
                    .bind(student.to_string())
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(backend)?;

        rows.into_iter()
            .map(|row| row.into_versioned().map(|v| v.value))
            .collect()
    }
}
