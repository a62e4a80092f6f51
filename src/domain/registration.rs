//! Registration records attached to an event.
//!
//! A [`Registration`] is created exactly once, when the engine accepts a
//! request, and is read-only afterwards. Profiles are snapshots taken at
//! registration time, so later profile edits never rewrite history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Lifecycle status of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Accepted and awaiting the event.
    Registered,
    /// Marked as attended.
    Attended,
    /// No longer holds a place. Nothing in this crate produces it yet.
    Cancelled,
}

impl RegistrationStatus {
    /// Returns `true` for statuses that occupy capacity and block
    /// re-registration by the same student.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Registered | Self::Attended)
    }
}

/// Whether a registration covers one student or a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationType {
    /// A single student.
    Individual,
    /// A leader plus one or more team members.
    Team,
}

impl RegistrationType {
    /// Returns the wire name (`"INDIVIDUAL"` / `"TEAM"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "INDIVIDUAL",
            Self::Team => "TEAM",
        }
    }
}

/// Contact and academic details captured for a participant.
///
/// Used both for the registering student (`participantProfile`) and for
/// each team member. Values are stored normalized: trimmed, with the
/// email lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantProfile {
    /// Full name.
    pub full_name: String,
    /// Lowercased email address.
    pub email: String,
    /// Ten-digit mobile number.
    pub mobile_number: String,
    /// College name.
    pub college_name: String,
    /// Academic branch.
    pub branch: String,
    /// Academic year.
    pub year: String,
}

/// Acknowledgments a student must accept before registering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Declarations {
    /// The student confirms the details provided are genuine.
    #[serde(default)]
    pub student_authenticity: bool,
    /// The student acknowledges how certificates are issued.
    #[serde(default)]
    pub certificate_awareness: bool,
}

impl Declarations {
    /// Returns `true` when every declaration has been accepted.
    #[must_use]
    pub const fn all_accepted(&self) -> bool {
        self.student_authenticity && self.certificate_awareness
    }
}

/// A committed registration of a student (or team) on an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// The registering student (team leader for team registrations).
    pub student_id: UserId,
    /// Current status.
    pub status: RegistrationStatus,
    /// Individual or team.
    pub registration_type: RegistrationType,
    /// Team name, present iff `registration_type` is `TEAM`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_name: Option<String>,
    /// Number of people covered by this record.
    #[serde(default = "default_head_count", deserialize_with = "lenient_head_count")]
    pub head_count: u32,
    /// Snapshot of the registering student's details.
    pub participant_profile: ParticipantProfile,
    /// Team members in the order they were submitted.
    #[serde(default)]
    pub team_members: Vec<ParticipantProfile>,
    /// Accepted declarations.
    pub declarations: Declarations,
    /// Commit timestamp.
    pub registered_at: DateTime<Utc>,
}

impl Registration {
    /// Returns `true` if this registration occupies capacity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Head count used for capacity accounting. Never below one.
    #[must_use]
    pub fn effective_head_count(&self) -> u32 {
        self.head_count.max(1)
    }
}

const fn default_head_count() -> u32 {
    1
}

/// Accepts any JSON value for `headCount`, falling back to 1.
///
/// Stored documents written by older clients may carry a fractional,
/// negative, string or null head count. Numbers are floored; everything
/// that does not yield a positive integer becomes 1.
fn lenient_head_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(head_count_from_value(&value))
}

/// Converts a loosely-typed head count into a positive integer.
#[must_use]
pub fn head_count_from_value(value: &serde_json::Value) -> u32 {
    let raw = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(n) if n.is_finite() && n >= 1.0 => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let floored = n.floor().min(f64::from(u32::MAX)) as u32;
            floored
        }
        _ => 1,
    }
}
