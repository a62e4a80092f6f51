//! Data Transfer Objects for REST request/response serialization.
//!
//! Domain payloads use camelCase field names; pagination metadata keeps
//! the snake_case shape shared by every list endpoint.

pub mod common_dto;
pub mod event_dto;
pub mod registration_dto;

pub use common_dto::*;
pub use event_dto::*;
pub use registration_dto::*;
