//! Registration request payload and its single parse pass.
//!
//! Clients submit either plain JSON or multipart-style forms where
//! nested objects arrive as JSON-encoded strings. Both shapes go through
//! [`RegistrationRequest::from_json`]; anything that does not fit the
//! schema becomes an [`RegistrationRejection::InvalidProfile`] before any
//! business rule runs.

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use super::profile::ProfileInput;
use super::registration::{Declarations, RegistrationType};
use super::rejection::RegistrationRejection;

/// A student's request to register for an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    /// Requested type. Defaults from the event's participation mode.
    #[serde(default, deserialize_with = "registration_type")]
    pub registration_type: Option<RegistrationType>,
    /// Declarations. Missing counts as not accepted.
    #[serde(default, deserialize_with = "embedded")]
    pub declarations: Option<Declarations>,
    /// Leader profile overrides.
    #[serde(default, deserialize_with = "embedded")]
    pub participant_profile: Option<ProfileInput>,
    /// Team name (team registrations only).
    #[serde(default, deserialize_with = "embedded_text")]
    pub team_name: Option<String>,
    /// Team members, excluding the leader.
    #[serde(default, deserialize_with = "embedded")]
    pub team_members: Option<Vec<ProfileInput>>,
}

impl RegistrationRequest {
    /// Parses a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationRejection::InvalidProfile`] describing the
    /// first structural problem.
    pub fn from_json(value: serde_json::Value) -> Result<Self, RegistrationRejection> {
        if !value.is_object() {
            return Err(RegistrationRejection::InvalidProfile(
                "Malformed registration payload: expected a JSON object".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| {
            RegistrationRejection::InvalidProfile(format!("Malformed registration payload: {e}"))
        })
    }

    /// Declarations as submitted, defaulting to none accepted.
    #[must_use]
    pub fn declarations(&self) -> Declarations {
        self.declarations.unwrap_or_default()
    }
}

/// Reads a nested value that may also arrive as a JSON-encoded string.
fn embedded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => {
            serde_json::from_str(&s).map(Some).map_err(D::Error::custom)
        }
        Some(v) => serde_json::from_value(v).map(Some).map_err(D::Error::custom),
    }
}

fn embedded_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(D::Error::custom(format!(
            "teamName must be a string, found {other}"
        ))),
    }
}

fn registration_type<'de, D>(deserializer: D) -> Result<Option<RegistrationType>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = embedded_text(deserializer)? else {
        return Ok(None);
    };
    match raw.trim().to_ascii_uppercase().as_str() {
        "" => Ok(None),
        "INDIVIDUAL" => Ok(Some(RegistrationType::Individual)),
        "TEAM" => Ok(Some(RegistrationType::Team)),
        other => Err(D::Error::custom(format!(
            "registrationType must be INDIVIDUAL or TEAM, found {other}"
        ))),
    }
}
