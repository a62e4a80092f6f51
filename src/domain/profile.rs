//! Participant profile resolution, normalization and validation.
//!
//! Profiles arrive partially filled from the client. The leader's
//! profile falls back to the requesting user's stored details field by
//! field; team members have no stored account and must be complete.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use super::registration::ParticipantProfile;
use super::rejection::RegistrationRejection;
use super::user::RequestingUser;

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid literal")
});

#[allow(clippy::expect_used)]
static MOBILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("mobile pattern is a valid literal"));

const MIN_NAME_CHARS: usize = 3;

/// Profile fields as submitted by the client. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    /// Full name.
    #[serde(default, deserialize_with = "stringish")]
    pub full_name: Option<String>,
    /// Email address.
    #[serde(default, deserialize_with = "stringish")]
    pub email: Option<String>,
    /// Mobile number.
    #[serde(default, deserialize_with = "stringish")]
    pub mobile_number: Option<String>,
    /// College name.
    #[serde(default, deserialize_with = "stringish")]
    pub college_name: Option<String>,
    /// Academic branch.
    #[serde(default, deserialize_with = "stringish")]
    pub branch: Option<String>,
    /// Academic year. Numbers are accepted and kept as text.
    #[serde(default, deserialize_with = "stringish")]
    pub year: Option<String>,
}

/// Accepts a string, a number or null.
fn stringish<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, found {other}"
        ))),
    }
}

/// Picks the submitted value when it is non-blank, else the fallback.
fn pick(submitted: Option<&str>, fallback: &str) -> String {
    submitted
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| fallback.trim())
        .to_string()
}

fn normalized(profile: ParticipantProfile) -> ParticipantProfile {
    ParticipantProfile {
        full_name: profile.full_name.trim().to_string(),
        email: profile.email.trim().to_lowercase(),
        mobile_number: profile.mobile_number.trim().to_string(),
        college_name: profile.college_name.trim().to_string(),
        branch: profile.branch.trim().to_string(),
        year: profile.year.trim().to_string(),
    }
}

/// Merges the submitted leader profile over the requesting user's details
/// and normalizes the result.
#[must_use]
pub fn resolve_leader_profile(
    submitted: Option<&ProfileInput>,
    user: &RequestingUser,
) -> ParticipantProfile {
    let empty = ProfileInput::default();
    let input = submitted.unwrap_or(&empty);
    normalized(ParticipantProfile {
        full_name: pick(input.full_name.as_deref(), &user.full_name),
        email: pick(input.email.as_deref(), &user.email),
        mobile_number: pick(input.mobile_number.as_deref(), &user.mobile_number),
        college_name: pick(input.college_name.as_deref(), &user.college_name),
        branch: pick(input.branch.as_deref(), &user.academic_profile.branch),
        year: pick(input.year.as_deref(), &user.academic_profile.year),
    })
}

/// Normalizes a team member profile. Missing fields become empty and
/// fail validation.
#[must_use]
pub fn resolve_member_profile(input: &ProfileInput) -> ParticipantProfile {
    normalized(ParticipantProfile {
        full_name: pick(input.full_name.as_deref(), ""),
        email: pick(input.email.as_deref(), ""),
        mobile_number: pick(input.mobile_number.as_deref(), ""),
        college_name: pick(input.college_name.as_deref(), ""),
        branch: pick(input.branch.as_deref(), ""),
        year: pick(input.year.as_deref(), ""),
    })
}

/// Returns `true` if `email` is shaped like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns `true` for a ten-digit mobile number starting with 6–9.
#[must_use]
pub fn is_valid_mobile(mobile: &str) -> bool {
    MOBILE_RE.is_match(mobile)
}

/// Validates a normalized profile, naming the person in the message
/// (e.g. `"Team member 2"`).
///
/// # Errors
///
/// Returns [`RegistrationRejection::InvalidProfile`] for the first field
/// that fails.
pub fn validate_profile(
    profile: &ParticipantProfile,
    label: &str,
) -> Result<(), RegistrationRejection> {
    let invalid = |msg: &str| -> Result<(), RegistrationRejection> {
        Err(RegistrationRejection::InvalidProfile(format!("{label} {msg}")))
    };

    if profile.full_name.chars().count() < MIN_NAME_CHARS {
        return invalid("name must be at least 3 characters");
    }
    if !is_valid_email(&profile.email) {
        return invalid("email is invalid");
    }
    if !is_valid_mobile(&profile.mobile_number) {
        return invalid("mobile number must be a valid 10-digit number");
    }
    if profile.college_name.is_empty() {
        return invalid("college name is required");
    }
    if profile.branch.is_empty() {
        return invalid("branch is required");
    }
    if profile.year.is_empty() {
        return invalid("year is required");
    }
    Ok(())
}
