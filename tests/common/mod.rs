//! Shared helpers: an in-process server on an ephemeral port and seeded
//! accounts.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use campus_events::api;
use campus_events::app_state::AppState;
use campus_events::domain::{AcademicProfile, FeedBus, RequestingUser, UserId, UserRole};
use campus_events::identity::UserDirectory;
use campus_events::persistence::InMemoryEventStore;
use campus_events::service::{ConflictRetryPolicy, EventService};
use reqwest::{RequestBuilder, Response};
use serde_json::{Value, json};

/// A running server and the directory behind it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub users: Arc<UserDirectory>,
    pub client: reqwest::Client,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Adds an account and returns it.
    pub async fn seed(&self, role: UserRole, n: u32) -> RequestingUser {
        let user = RequestingUser {
            id: UserId::new(),
            role,
            full_name: format!("Campus User {n}"),
            email: format!("user{n}@campus.edu"),
            mobile_number: format!("9{n:09}"),
            college_name: "State Engineering College".to_string(),
            academic_profile: AcademicProfile {
                branch: "IT".to_string(),
                year: "3".to_string(),
            },
        };
        self.users.insert(user.clone()).await;
        user
    }

    /// `GET path`, optionally as `user`, decoded as JSON.
    pub async fn get_json(&self, path: &str, user: Option<&RequestingUser>) -> Value {
        let mut request = self.client.get(self.url(path));
        if let Some(user) = user {
            request = request.header("x-user-id", user.id.to_string());
        }
        json_body(send(request).await).await
    }

    /// Creates a draft event as `owner` and returns the response body.
    pub async fn create_event(&self, owner: &RequestingUser, draft: Value) -> Value {
        let request = self
            .client
            .post(self.url("/api/v1/events"))
            .header("x-user-id", owner.id.to_string())
            .json(&draft);
        json_body(send(request).await).await
    }

    /// Creates and publishes an event, returning its ID.
    pub async fn published_event(&self, owner: &RequestingUser, registration: Value) -> String {
        let created = self
            .create_event(
                owner,
                json!({
                    "title": "Integration Fest",
                    "description": "End-to-end checks",
                    "venue": "Auditorium",
                    "registration": registration,
                }),
            )
            .await;
        let Some(id) = created["id"].as_str().map(str::to_string) else {
            panic!("created event has no id: {created}");
        };

        let response = self.set_status(owner, &id, "Published").await;
        assert_eq!(response.status(), 200);
        id
    }

    /// `PATCH /events/{id}/status` as `owner`.
    pub async fn set_status(
        &self,
        owner: &RequestingUser,
        event_id: &str,
        status: &str,
    ) -> Response {
        let request = self
            .client
            .patch(self.url(&format!("/api/v1/events/{event_id}/status")))
            .header("x-user-id", owner.id.to_string())
            .json(&json!({"status": status}));
        send(request).await
    }

    /// Registers `user` with a payload accepting both declarations.
    pub async fn register(&self, user: &RequestingUser, event_id: &str) -> Response {
        self.register_with(user, event_id, accepted()).await
    }

    pub async fn register_with(
        &self,
        user: &RequestingUser,
        event_id: &str,
        payload: Value,
    ) -> Response {
        let request = self
            .client
            .post(self.url(&format!("/api/v1/events/{event_id}/registrations")))
            .header("x-user-id", user.id.to_string())
            .json(&payload);
        send(request).await
    }
}

/// Sends `request`, failing the test on transport errors.
pub async fn send(request: RequestBuilder) -> Response {
    match request.send().await {
        Ok(response) => response,
        Err(e) => panic!("request failed: {e}"),
    }
}

/// Decodes a response body as JSON, failing the test otherwise.
pub async fn json_body(response: Response) -> Value {
    let status = response.status();
    let Ok(body) = response.json::<Value>().await else {
        panic!("response with status {status} is not JSON");
    };
    body
}

pub fn accepted() -> Value {
    json!({"declarations": {"studentAuthenticity": true, "certificateAwareness": true}})
}

/// Starts the full application on `127.0.0.1:0`.
pub async fn spawn_server() -> TestServer {
    let users = Arc::new(UserDirectory::new());
    let service = EventService::new(
        Arc::new(InMemoryEventStore::new()),
        FeedBus::new(1024),
        ConflictRetryPolicy::new(3, Duration::from_millis(1)),
    );
    let app = api::build_app(AppState::new(service, Arc::clone(&users)));

    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("cannot bind an ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has no local address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestServer {
        addr,
        users,
        client: reqwest::Client::new(),
    }
}
