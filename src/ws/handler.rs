//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// The subscription to the feed bus is taken before the upgrade, so no
/// feed event published after this call is missed.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let feed_rx = state.feed_bus.subscribe();
    let event_service = Arc::clone(&state.event_service);

    ws.on_upgrade(move |socket| run_connection(socket, feed_rx, event_service))
}
