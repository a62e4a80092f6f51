//! Event aggregate: lifecycle status, registration policy, participants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::projection::count_active_participants;
use super::registration::{Registration, RegistrationType};
use super::{EventId, UserId};
use crate::error::CampusError;

/// Default value of [`RegistrationConfig::max_team_members`].
pub const DEFAULT_MAX_TEAM_MEMBERS: u32 = 4;

/// Lifecycle status of an event. Only `Published` accepts registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EventStatus {
    /// Being prepared by its organizer; not publicly visible.
    Draft,
    /// Visible and open for registration (subject to the registration config).
    Published,
    /// The event took place.
    Completed,
    /// The event was called off.
    Cancelled,
}

impl EventStatus {
    /// Returns `true` if an event may move from `self` to `next`.
    ///
    /// `Completed` and `Cancelled` are terminal. Staying in the same
    /// status is always allowed.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Draft | Self::Published | Self::Cancelled)
                | (Self::Published, Self::Published | Self::Completed | Self::Cancelled)
                | (Self::Completed, Self::Completed)
                | (Self::Cancelled, Self::Cancelled)
        )
    }

    /// Returns `true` if anonymous clients may see the event.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Published | Self::Completed)
    }

    /// Returns the serialized name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Published => "Published",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event-level policy for individual and team registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipationMode {
    /// Only individual registrations.
    #[default]
    Individual,
    /// Only team registrations.
    Team,
    /// Either kind.
    Both,
}

impl ParticipationMode {
    /// Parses a mode name, case-insensitively. Unknown names yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "INDIVIDUAL" => Some(Self::Individual),
            "TEAM" => Some(Self::Team),
            "BOTH" => Some(Self::Both),
            _ => None,
        }
    }

    /// Returns `true` if team registrations are permitted.
    #[must_use]
    pub const fn allows_teams(self) -> bool {
        matches!(self, Self::Team | Self::Both)
    }
}

/// Reads a stored participation mode, treating unset or unknown values
/// as `INDIVIDUAL`.
fn lenient_mode<'de, D>(deserializer: D) -> Result<ParticipationMode, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(ParticipationMode::parse)
        .unwrap_or_default())
}

const fn default_open() -> bool {
    true
}

const fn default_max_team_members() -> u32 {
    DEFAULT_MAX_TEAM_MEMBERS
}

/// Registration policy of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationConfig {
    /// Master switch. Only an explicit `false` closes registration.
    #[serde(default = "default_open")]
    pub is_open: bool,
    /// Registrations strictly after this instant are rejected.
    #[serde(default)]
    pub last_date: Option<DateTime<Utc>>,
    /// Cap on total active head count. `None` or `0` means unlimited.
    #[serde(default)]
    pub max_participants: Option<u32>,
    /// Individual / team policy.
    #[serde(default, deserialize_with = "lenient_mode")]
    pub participation_mode: ParticipationMode,
    /// Largest team size including the leader.
    #[serde(default = "default_max_team_members")]
    pub max_team_members: u32,
    /// Registration fee. Informational only; no payment flow exists.
    #[serde(default)]
    pub fee: f64,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            is_open: true,
            last_date: None,
            max_participants: None,
            participation_mode: ParticipationMode::Individual,
            max_team_members: DEFAULT_MAX_TEAM_MEMBERS,
            fee: 0.0,
        }
    }
}

impl RegistrationConfig {
    /// Effective head-count cap, ignoring unset and zero values.
    #[must_use]
    pub fn capacity(&self) -> Option<u64> {
        self.max_participants
            .filter(|&max| max > 0)
            .map(u64::from)
    }

    /// Largest number of members a leader may bring, never below one.
    #[must_use]
    pub fn max_additional_members(&self) -> usize {
        let additional = self.max_team_members.saturating_sub(1).max(1);
        usize::try_from(additional).unwrap_or(usize::MAX)
    }

    /// Checks organizer-supplied values.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::InvalidRequest`] if `maxTeamMembers` is below
    /// 2, `maxParticipants` is zero, or the fee is negative or not finite.
    pub fn validate(&self) -> Result<(), CampusError> {
        if self.max_team_members < 2 {
            return Err(CampusError::InvalidRequest(
                "maxTeamMembers must be at least 2".to_string(),
            ));
        }
        if self.max_participants == Some(0) {
            return Err(CampusError::InvalidRequest(
                "maxParticipants must be a positive integer".to_string(),
            ));
        }
        if !self.fee.is_finite() || self.fee < 0.0 {
            return Err(CampusError::InvalidRequest(
                "fee must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update of a [`RegistrationConfig`]. Absent fields are kept.
///
/// `lastDate` and `maxParticipants` distinguish "absent" from an explicit
/// `null`, which clears the deadline or the cap.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationConfigPatch {
    /// New open switch.
    #[serde(default)]
    pub is_open: Option<bool>,
    /// New deadline; `null` removes it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_date: Option<Option<DateTime<Utc>>>,
    /// New head-count cap; `null` removes it.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<u32>)]
    pub max_participants: Option<Option<u32>>,
    /// New participation mode.
    #[serde(default)]
    pub participation_mode: Option<ParticipationMode>,
    /// New team size limit.
    #[serde(default)]
    pub max_team_members: Option<u32>,
    /// New fee.
    #[serde(default)]
    pub fee: Option<f64>,
}

/// Marks a field as present, so `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl RegistrationConfigPatch {
    /// Returns `base` with the present fields replaced.
    #[must_use]
    pub fn apply_to(&self, base: &RegistrationConfig) -> RegistrationConfig {
        RegistrationConfig {
            is_open: self.is_open.unwrap_or(base.is_open),
            last_date: self.last_date.unwrap_or(base.last_date),
            max_participants: self.max_participants.unwrap_or(base.max_participants),
            participation_mode: self.participation_mode.unwrap_or(base.participation_mode),
            max_team_members: self.max_team_members.unwrap_or(base.max_team_members),
            fee: self.fee.unwrap_or(base.fee),
        }
    }
}

/// Organizer input for a new event.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    /// Event title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Where the event takes place.
    #[serde(default)]
    pub venue: Option<String>,
    /// When the event starts.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// Registration policy. Unlike stored documents, unknown participation
    /// modes are rejected.
    #[serde(default, deserialize_with = "organizer_config")]
    pub registration: RegistrationConfig,
}

/// Reads organizer input strictly by way of [`RegistrationConfigPatch`],
/// filling absent fields with the defaults.
fn organizer_config<'de, D>(deserializer: D) -> Result<RegistrationConfig, D::Error>
where
    D: Deserializer<'de>,
{
    let patch = RegistrationConfigPatch::deserialize(deserializer)?;
    Ok(patch.apply_to(&RegistrationConfig::default()))
}

/// A campus event and its registrations.
///
/// `participants` is private: the only way to add a record is
/// [`Event::append_registration`], called by the registration commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Owning organizer.
    pub organizer_id: UserId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Where the event takes place.
    #[serde(default)]
    pub venue: Option<String>,
    /// When the event starts.
    #[serde(default)]
    pub starts_at: Option<DateTime<Utc>>,
    /// Lifecycle status.
    pub status: EventStatus,
    /// Registration policy.
    #[serde(default)]
    pub registration: RegistrationConfig,
    #[serde(default)]
    participants: Vec<Registration>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Builds a new `Draft` event owned by `organizer_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::InvalidRequest`] if the title is blank or the
    /// registration config is invalid.
    pub fn create(organizer_id: UserId, draft: EventDraft) -> Result<Self, CampusError> {
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(CampusError::InvalidRequest(
                "title must not be empty".to_string(),
            ));
        }
        draft.registration.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: EventId::new(),
            organizer_id,
            title,
            description: draft.description.trim().to_string(),
            venue: draft
                .venue
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            starts_at: draft.starts_at,
            status: EventStatus::Draft,
            registration: draft.registration,
            participants: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// All registrations in commit order, active or not.
    #[must_use]
    pub fn participants(&self) -> &[Registration] {
        &self.participants
    }

    /// Returns the active registration held by `student_id`, if any.
    #[must_use]
    pub fn active_registration_of(&self, student_id: UserId) -> Option<&Registration> {
        self.participants
            .iter()
            .find(|r| r.student_id == student_id && r.is_active())
    }

    /// Returns `true` if `user_id` organizes this event.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.organizer_id == user_id
    }

    /// Moves the event to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::InvalidRequest`] for transitions out of a
    /// terminal status or back to `Draft`.
    pub fn transition_to(&mut self, next: EventStatus) -> Result<(), CampusError> {
        if !self.status.can_transition_to(next) {
            return Err(CampusError::InvalidRequest(format!(
                "cannot move event from {:?} to {next:?}",
                self.status
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Replaces the registration policy.
    ///
    /// The new policy must still admit every active registration: the cap
    /// covers the current head count, the mode allows each registration
    /// type present, and the team size fits the largest team.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::InvalidRequest`] if `config` is invalid or
    /// contradicts the existing registrations.
    pub fn replace_registration_config(
        &mut self,
        config: RegistrationConfig,
    ) -> Result<(), CampusError> {
        config.validate()?;
        self.admits_participants(&config)?;
        self.registration = config;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn admits_participants(&self, config: &RegistrationConfig) -> Result<(), CampusError> {
        let head_count = count_active_participants(&self.participants);
        if config.capacity().is_some_and(|cap| cap < head_count) {
            return Err(CampusError::InvalidRequest(format!(
                "maxParticipants cannot be below the {head_count} participants already registered"
            )));
        }

        let excluded = match config.participation_mode {
            ParticipationMode::Individual => Some(RegistrationType::Team),
            ParticipationMode::Team => Some(RegistrationType::Individual),
            ParticipationMode::Both => None,
        };
        let active = || self.participants.iter().filter(|r| r.is_active());
        if let Some(kind) = excluded.filter(|&kind| active().any(|r| r.registration_type == kind)) {
            return Err(CampusError::InvalidRequest(format!(
                "participationMode conflicts with existing {} registrations",
                kind.as_str()
            )));
        }

        let largest_team = active()
            .filter(|r| r.registration_type == RegistrationType::Team)
            .map(|r| r.team_members.len())
            .max()
            .unwrap_or(0);
        if largest_team > config.max_additional_members() {
            return Err(CampusError::InvalidRequest(format!(
                "maxTeamMembers cannot be below an existing team of {}",
                largest_team.saturating_add(1)
            )));
        }
        Ok(())
    }

    /// Appends a committed registration.
    pub(crate) fn append_registration(&mut self, registration: Registration) {
        self.updated_at = registration.registered_at;
        self.participants.push(registration);
    }
}
