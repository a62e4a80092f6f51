//! Domain layer: events, registrations, the registration engine and the
//! live feed.
//!
//! Everything here except [`FeedBus`] and [`EventLocks`] is synchronous
//! and free of I/O. The engine validates against an in-memory snapshot;
//! loading and saving that snapshot is the service layer's job.

pub mod engine;
pub mod event;
pub mod event_locks;
pub mod feed_bus;
pub mod feed_event;
pub mod ids;
pub mod profile;
pub mod projection;
pub mod registration;
pub mod rejection;
pub mod request;
pub mod user;

pub use engine::{apply_registration, register_participant};
pub use event::{
    Event, EventDraft, EventStatus, ParticipationMode, RegistrationConfig, RegistrationConfigPatch,
};
pub use event_locks::{EventLockGuard, EventLocks};
pub use feed_bus::FeedBus;
pub use feed_event::FeedEvent;
pub use ids::{EventId, UserId};
pub use projection::{
    EventSummary, MyRegistration, count_active_participants, project_event_for_listing,
    project_event_for_student,
};
pub use registration::{
    Declarations, ParticipantProfile, Registration, RegistrationStatus, RegistrationType,
};
pub use rejection::RegistrationRejection;
pub use request::RegistrationRequest;
pub use user::{AcademicProfile, RequestingUser, UserRole};
