//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` streams live feed events (publications,
//! status changes, registration counts) to clients subscribed to the
//! matching event IDs. Feed events carry identifiers and counts only.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
