//! Service layer: business logic orchestration.
//!
//! [`EventService`] coordinates event lifecycle changes and registration
//! commits against an [`crate::persistence::EventStore`], retries version
//! conflicts per [`ConflictRetryPolicy`], and emits feed events through the
//! [`crate::domain::FeedBus`].

pub mod event_service;
pub mod retry;

pub use event_service::{EventService, RegistrationOutcome};
pub use retry::ConflictRetryPolicy;
