//! Authenticated user as supplied by the identity provider.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    /// Discovers and registers for events.
    #[default]
    Student,
    /// Creates and manages events.
    Organizer,
    /// Manages accounts; may act on any event.
    Admin,
}

/// Branch and year of study.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcademicProfile {
    /// Academic branch.
    #[serde(default)]
    pub branch: String,
    /// Academic year.
    #[serde(default)]
    pub year: String,
}

/// The user a request acts on behalf of.
///
/// Treated as read-only input: its profile fields pre-fill a
/// registration's `participantProfile` when the payload omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestingUser {
    /// User identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: UserId,
    /// Account role.
    #[serde(default)]
    pub role: UserRole,
    /// Full name.
    #[serde(default)]
    pub full_name: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Mobile number.
    #[serde(default)]
    pub mobile_number: String,
    /// College name.
    #[serde(default)]
    pub college_name: String,
    /// Branch and year.
    #[serde(default)]
    pub academic_profile: AcademicProfile,
}

impl RequestingUser {
    /// Returns `true` for organizers and admins.
    #[must_use]
    pub const fn can_manage_events(&self) -> bool {
        matches!(self.role, UserRole::Organizer | UserRole::Admin)
    }

    /// Returns `true` for admins.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}
