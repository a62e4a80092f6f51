//! Reasons a registration request is turned down.
//!
//! Every variant is an expected business outcome, returned as a value so
//! callers can render its message directly. None of them indicates a
//! fault in the service.

use chrono::{DateTime, Utc};

/// Why the engine refused a registration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRejection {
    /// The event is not in `Published` status.
    #[error("Registrations are only accepted for published events")]
    NotPublished,

    /// The organizer closed registration.
    #[error("Registration for this event is closed")]
    RegistrationClosed,

    /// The registration deadline has passed.
    #[error("The registration deadline ({0}) has passed")]
    DeadlinePassed(DateTime<Utc>),

    /// The student already holds an active registration.
    #[error("You are already registered for this event")]
    AlreadyRegistered,

    /// The registration type conflicts with the event's participation mode.
    #[error("{0}")]
    ModeMismatch(String),

    /// One or more declarations were not accepted.
    #[error("Please accept all declarations to register")]
    DeclarationsIncomplete,

    /// A profile field is missing or malformed, or the payload itself is.
    #[error("{0}")]
    InvalidProfile(String),

    /// Team name is too short.
    #[error("Team name must be at least 2 characters")]
    InvalidTeamName,

    /// A team registration without members.
    #[error("Add at least one team member for a team registration")]
    NoTeamMembers,

    /// More members than the event allows.
    #[error("A team can have at most {max_additional} additional members besides the leader")]
    TeamTooLarge {
        /// Largest allowed member count, excluding the leader.
        max_additional: usize,
    },

    /// Two people in the same team share an email address.
    #[error("Every team member must have a unique email address ({0} appears more than once)")]
    DuplicateTeamEmail(String),

    /// Not enough places left for this head count.
    #[error("This event is full: {remaining} of {capacity} places left, {requested} requested")]
    EventFull {
        /// Configured head-count cap.
        capacity: u64,
        /// Places still free before this request.
        remaining: u64,
        /// Head count of the rejected request.
        requested: u64,
    },
}

impl RegistrationRejection {
    /// Returns the numeric error code for this rejection.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::NotPublished => 1101,
            Self::RegistrationClosed => 1102,
            Self::DeadlinePassed(_) => 1103,
            Self::AlreadyRegistered => 1104,
            Self::ModeMismatch(_) => 1105,
            Self::DeclarationsIncomplete => 1106,
            Self::InvalidProfile(_) => 1107,
            Self::InvalidTeamName => 1108,
            Self::NoTeamMembers => 1109,
            Self::TeamTooLarge { .. } => 1110,
            Self::DuplicateTeamEmail(_) => 1111,
            Self::EventFull { .. } => 1112,
        }
    }

    /// Returns `true` for eligibility-gate failures (status, switch, deadline).
    #[must_use]
    pub const fn is_eligibility(&self) -> bool {
        matches!(
            self,
            Self::NotPublished | Self::RegistrationClosed | Self::DeadlinePassed(_)
        )
    }

    /// Stable snake_case name, used as a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotPublished => "not_published",
            Self::RegistrationClosed => "registration_closed",
            Self::DeadlinePassed(_) => "deadline_passed",
            Self::AlreadyRegistered => "already_registered",
            Self::ModeMismatch(_) => "mode_mismatch",
            Self::DeclarationsIncomplete => "declarations_incomplete",
            Self::InvalidProfile(_) => "invalid_profile",
            Self::InvalidTeamName => "invalid_team_name",
            Self::NoTeamMembers => "no_team_members",
            Self::TeamTooLarge { .. } => "team_too_large",
            Self::DuplicateTeamEmail(_) => "duplicate_team_email",
            Self::EventFull { .. } => "event_full",
        }
    }
}
