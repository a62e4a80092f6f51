//! Caller identity extractors.
//!
//! The caller names themselves with the `x-user-id` header; token issuance
//! and verification happen upstream of this service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::app_state::AppState;
use crate::domain::{RequestingUser, UserId};
use crate::error::CampusError;
use crate::identity::IdentityProvider;

/// Header carrying the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// ID from the `x-user-id` header, whether or not an account exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerId(pub UserId);

/// A caller resolved to a known account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub RequestingUser);

/// A caller that may be anonymous. Present but unknown IDs are rejected.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<RequestingUser>);

fn header_user_id(parts: &Parts) -> Result<Option<UserId>, CampusError> {
    let Some(value) = parts.headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| CampusError::Unauthorized)?;
    raw.parse::<UserId>()
        .map(Some)
        .map_err(|_| CampusError::Unauthorized)
}

impl FromRequestParts<AppState> for CallerId {
    type Rejection = CampusError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, Self::Rejection> {
        header_user_id(parts)?
            .map(Self)
            .ok_or(CampusError::Unauthorized)
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = CampusError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = header_user_id(parts)?.ok_or(CampusError::Unauthorized)?;
        state
            .users
            .resolve(user_id)
            .await
            .map(Self)
            .ok_or(CampusError::Unauthorized)
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = CampusError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match header_user_id(parts)? {
            None => Ok(Self(None)),
            Some(user_id) => state
                .users
                .resolve(user_id)
                .await
                .map(|user| Self(Some(user)))
                .ok_or(CampusError::Unauthorized),
        }
    }
}
