//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::FeedBus;
use crate::identity::UserDirectory;
use crate::service::EventService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event service for all business logic.
    pub event_service: Arc<EventService>,
    /// Feed bus for WebSocket subscriptions.
    pub feed_bus: FeedBus,
    /// Account directory used to resolve callers.
    pub users: Arc<UserDirectory>,
}

impl AppState {
    /// Builds the state around a service, sharing its feed bus.
    #[must_use]
    pub fn new(event_service: EventService, users: Arc<UserDirectory>) -> Self {
        let feed_bus = event_service.feed_bus().clone();
        Self {
            event_service: Arc::new(event_service),
            feed_bus,
            users,
        }
    }
}
