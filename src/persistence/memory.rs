//! In-memory event store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EventFilter, EventStore, StoreError, Versioned};
use crate::domain::{Event, EventId};

/// Event store held in process memory.
///
/// Versions behave exactly as in the PostgreSQL store, so the service's
/// conflict handling is exercised the same way in tests and in
/// single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<EventId, Versioned<Event>>>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    /// Returns `true` if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert(&self, event: &Event) -> Result<u64, StoreError> {
        let mut map = self.events.write().await;
        if map.contains_key(&event.id) {
            return Err(StoreError::AlreadyExists(event.id));
        }
        map.insert(
            event.id,
            Versioned {
                value: event.clone(),
                version: 1,
            },
        );
        Ok(1)
    }

    async fn load(&self, event_id: EventId) -> Result<Versioned<Event>, StoreError> {
        self.events
            .read()
            .await
            .get(&event_id)
            .cloned()
            .ok_or(StoreError::NotFound(event_id))
    }

    async fn save(&self, event: &Event, expected_version: u64) -> Result<u64, StoreError> {
        let mut map = self.events.write().await;
        let stored = map
            .get_mut(&event.id)
            .ok_or(StoreError::NotFound(event.id))?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict {
                event_id: event.id,
                expected: expected_version,
            });
        }
        stored.value = event.clone();
        stored.version = stored.version.saturating_add(1);
        Ok(stored.version)
    }

    async fn list(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let map = self.events.read().await;
        let mut events: Vec<Event> = map
            .values()
            .filter(|v| filter.matches(&v.value))
            .map(|v| v.value.clone())
            .collect();
        events.sort_by_key(|e| e.created_at);
        Ok(events)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{EventDraft, EventStatus, RegistrationConfig, UserId};

    fn make_event(organizer: UserId) -> Event {
        let Ok(event) = Event::create(
            organizer,
            EventDraft {
                title: "Design Jam".to_string(),
                description: String::new(),
                venue: Some("Hall B".to_string()),
                starts_at: None,
                registration: RegistrationConfig::default(),
            },
        ) else {
            panic!("valid draft");
        };
        event
    }

    #[tokio::test]
    async fn insert_and_load() {
        let store = InMemoryEventStore::new();
        let event = make_event(UserId::new());

        assert_eq!(store.insert(&event).await, Ok(1));
        let Ok(loaded) = store.load(event.id).await else {
            panic!("event should load");
        };
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.value, event);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let store = InMemoryEventStore::new();
        let event = make_event(UserId::new());
        let _ = store.insert(&event).await;
        assert_eq!(
            store.insert(&event).await,
            Err(StoreError::AlreadyExists(event.id))
        );
    }

    #[tokio::test]
    async fn load_missing_is_not_found() {
        let store = InMemoryEventStore::new();
        let id = EventId::new();
        assert!(matches!(store.load(id).await, Err(StoreError::NotFound(e)) if e == id));
    }

    #[tokio::test]
    async fn save_bumps_version() {
        let store = InMemoryEventStore::new();
        let mut event = make_event(UserId::new());
        let _ = store.insert(&event).await;

        event.title = "Design Jam 2".to_string();
        assert_eq!(store.save(&event, 1).await, Ok(2));
        let Ok(loaded) = store.load(event.id).await else {
            panic!("event should load");
        };
        assert_eq!(loaded.value.title, "Design Jam 2");
        assert_eq!(loaded.version, 2);
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let store = InMemoryEventStore::new();
        let event = make_event(UserId::new());
        let _ = store.insert(&event).await;
        let _ = store.save(&event, 1).await;

        assert_eq!(
            store.save(&event, 1).await,
            Err(StoreError::Conflict {
                event_id: event.id,
                expected: 1
            })
        );
    }

    #[tokio::test]
    async fn list_filters() {
        let store = InMemoryEventStore::new();
        let organizer = UserId::new();
        let mut published = make_event(organizer);
        let Ok(()) = published.transition_to(EventStatus::Published) else {
            panic!("draft can be published");
        };
        let _ = store.insert(&published).await;
        let _ = store.insert(&make_event(UserId::new())).await;

        let Ok(all) = store.list(EventFilter::All).await else {
            panic!("list failed");
        };
        assert_eq!(all.len(), 2);

        let Ok(public) = store.list(EventFilter::Published).await else {
            panic!("list failed");
        };
        assert_eq!(public.len(), 1);

        let Ok(mine) = store.list(EventFilter::OrganizedBy(organizer)).await else {
            panic!("list failed");
        };
        assert_eq!(mine.len(), 1);
        assert_eq!(store.len().await, 2);
    }
}
