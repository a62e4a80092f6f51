//! Identity lookup.
//!
//! Requests name their caller with a user ID; an [`IdentityProvider`]
//! turns that ID into a [`RequestingUser`]. The bundled
//! [`UserDirectory`] keeps accounts in memory and can be seeded from a
//! JSON file at startup.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::{AcademicProfile, RequestingUser, UserId};
use crate::error::CampusError;

/// Resolves user IDs to accounts.
#[async_trait]
pub trait IdentityProvider: Send + Sync + std::fmt::Debug {
    /// Returns the account for `user_id`, or `None` if it is unknown.
    async fn resolve(&self, user_id: UserId) -> Option<RequestingUser>;
}

/// Self-service profile fields a user may change.
///
/// Role is deliberately absent: it is assigned by seeding, never by the
/// user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
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

/// In-memory account directory.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<HashMap<UserId, RequestingUser>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `users`.
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = RequestingUser>) -> Self {
        Self {
            users: RwLock::new(users.into_iter().map(|u| (u.id, u)).collect()),
        }
    }

    /// Loads a JSON array of accounts from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CampusError::Internal`] if the file cannot be read or parsed.
    pub async fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CampusError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            CampusError::Internal(format!("cannot read user directory {}: {e}", path.display()))
        })?;
        let users: Vec<RequestingUser> = serde_json::from_str(&raw).map_err(|e| {
            CampusError::Internal(format!("invalid user directory {}: {e}", path.display()))
        })?;
        info!(path = %path.display(), users = users.len(), "user directory loaded");
        Ok(Self::with_users(users))
    }

    /// Inserts or replaces an account verbatim.
    pub async fn insert(&self, user: RequestingUser) {
        self.users.write().await.insert(user.id, user);
    }

    /// Applies a self-service profile update and returns the stored account.
    ///
    /// Existing accounts keep their role; new accounts start as students.
    pub async fn upsert_profile(&self, user_id: UserId, update: ProfileUpdate) -> RequestingUser {
        let mut users = self.users.write().await;
        let role = users.get(&user_id).map(|u| u.role).unwrap_or_default();
        let user = RequestingUser {
            id: user_id,
            role,
            full_name: update.full_name.trim().to_string(),
            email: update.email.trim().to_string(),
            mobile_number: update.mobile_number.trim().to_string(),
            college_name: update.college_name.trim().to_string(),
            academic_profile: AcademicProfile {
                branch: update.academic_profile.branch.trim().to_string(),
                year: update.academic_profile.year.trim().to_string(),
            },
        };
        users.insert(user_id, user.clone());
        user
    }

    /// Returns the number of accounts.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Returns `true` if there are no accounts.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for UserDirectory {
    async fn resolve(&self, user_id: UserId) -> Option<RequestingUser> {
        self.users.read().await.get(&user_id).cloned()
    }
}
