//! # campus-events
//!
//! REST API and WebSocket service for campus event discovery and
//! registration.
//!
//! Organizers publish events with a registration policy (open switch,
//! deadline, capacity, individual or team participation). Students
//! register individually or as team leaders; every request is checked by
//! a pure registration engine and committed with optimistic concurrency,
//! so duplicate registrations and capacity overshoot cannot slip through
//! concurrent requests.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── EventService (service/)
//!     ├── FeedBus (domain/)
//!     │
//!     ├── Registration engine, projections (domain/)
//!     ├── EventLocks (domain/)
//!     │
//!     └── EventStore: in-memory or PostgreSQL (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod persistence;
pub mod service;
pub mod ws;
