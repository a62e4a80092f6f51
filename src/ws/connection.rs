//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered feed events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{Subscriptions, Targets};
use crate::domain::{EventId, FeedEvent};
use crate::service::EventService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut feed_rx: broadcast::Receiver<FeedEvent>,
    event_service: Arc<EventService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = Subscriptions::new();

    loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &event_service).await;
                        if let Ok(json) = serde_json::to_string(&response)
                            && ws_tx.send(Message::text(json)).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = feed_rx.recv() => {
                match event {
                    Ok(feed_event) => {
                        if !subs.wants(&feed_event) {
                            continue;
                        }
                        let msg = WsMessage::new(
                            uuid::Uuid::new_v4().to_string(),
                            WsMessageType::Event,
                            serde_json::to_value(&feed_event).unwrap_or_default(),
                        );
                        let json = serde_json::to_string(&msg).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind feed bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply.
pub async fn handle_text_message(
    text: &str,
    subs: &mut Subscriptions,
    event_service: &EventService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    if msg.msg_type != WsMessageType::Command {
        return WsMessage::error(msg.id, 400, "expected a command");
    }
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { event_ids } => {
            let targets = Targets::parse(&event_ids);
            subs.add(&targets);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                json!({
                    "subscribed": targets.id_strings(),
                    "invalid": targets.invalid,
                    "count": subs.len(),
                    "wildcard": subs.is_wildcard(),
                }),
            )
        }
        WsCommand::Unsubscribe { event_ids } => {
            let targets = Targets::parse(&event_ids);
            subs.remove(&targets);
            WsMessage::new(
                msg.id,
                WsMessageType::Response,
                json!({
                    "unsubscribed": targets.id_strings(),
                    "invalid": targets.invalid,
                    "remaining_count": subs.len(),
                    "wildcard": subs.is_wildcard(),
                }),
            )
        }
        WsCommand::GetEvent { event_id } => {
            let Ok(event_id) = event_id.parse::<EventId>() else {
                return WsMessage::error(msg.id, 400, "invalid event id");
            };
            match event_service.event_detail(event_id, None).await {
                Ok(summary) => WsMessage::new(
                    msg.id,
                    WsMessageType::Response,
                    serde_json::to_value(&summary).unwrap_or_default(),
                ),
                Err(err) => {
                    let code = err.status_code().as_u16();
                    WsMessage::error(msg.id, code, &err.to_string())
                }
            }
        }
    }
}
