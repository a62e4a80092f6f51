//! Response body for registration commits.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventSummary, MyRegistration};
use crate::service::RegistrationOutcome;

/// Confirmation returned after a committed registration.
///
/// Carries the caller's own registration in reduced form and the updated
/// event summary; no other participant data is included.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationReceipt {
    /// The new registration.
    pub registration: MyRegistration,
    /// The event after the commit.
    pub event: EventSummary,
    /// Places left, if the event is capped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_capacity: Option<u64>,
}

impl From<RegistrationOutcome> for RegistrationReceipt {
    fn from(outcome: RegistrationOutcome) -> Self {
        let remaining_capacity = outcome
            .event
            .registration
            .capacity()
            .map(|cap| cap.saturating_sub(outcome.event.participant_count));
        Self {
            registration: MyRegistration::from(&outcome.registration),
            event: outcome.event,
            remaining_capacity,
        }
    }
}
