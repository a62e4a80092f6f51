//! End-to-end REST checks against a server bound to an ephemeral port.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use campus_events::domain::UserRole;
use futures_util::future::join_all;
use serde_json::{Value, json};
use tokio_test::assert_ok;

use common::{accepted, json_body, send, spawn_server};

#[tokio::test]
async fn health_and_catalog() {
    let server = spawn_server().await;

    let health = server.get_json("/health", None).await;
    assert_eq!(health["status"], "healthy");

    let modes = server.get_json("/config/participation-modes", None).await;
    let Some(modes) = modes.as_array() else {
        panic!("catalog should be an array: {modes}");
    };
    assert_eq!(modes.len(), 3);
    assert_eq!(modes[1]["mode"], "TEAM");
    assert_eq!(modes[1]["allowsIndividuals"], false);
}

#[tokio::test]
async fn identity_is_required_for_writes() {
    let server = spawn_server().await;

    let anonymous = send(
        server
            .client
            .post(server.url("/api/v1/events"))
            .json(&json!({"title": "Nope"})),
    )
    .await;
    assert_eq!(anonymous.status(), 401);

    let unknown = send(
        server
            .client
            .post(server.url("/api/v1/events"))
            .header("x-user-id", uuid::Uuid::new_v4().to_string())
            .json(&json!({"title": "Nope"})),
    )
    .await;
    assert_eq!(unknown.status(), 401);
    let body = json_body(unknown).await;
    assert_eq!(body["error"]["code"], 2001);

    let student = server.seed(UserRole::Student, 1).await;
    let forbidden = send(
        server
            .client
            .post(server.url("/api/v1/events"))
            .header("x-user-id", student.id.to_string())
            .json(&json!({"title": "Nope"})),
    )
    .await;
    assert_eq!(forbidden.status(), 403);
}

#[tokio::test]
async fn registration_flow() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let student = server.seed(UserRole::Student, 2).await;
    let event_id = server
        .published_event(&organizer, json!({"maxParticipants": 10}))
        .await;

    let listed = server.get_json("/api/v1/events", None).await;
    assert_eq!(listed["pagination"]["total"], 1);
    assert_eq!(listed["data"][0]["participantCount"], 0);
    assert!(listed["data"][0].get("participants").is_none());

    // Nested parts sent as JSON-encoded strings, the way form clients do.
    let response = server
        .register_with(
            &student,
            &event_id,
            json!({
                "registrationType": "individual",
                "declarations": "{\"studentAuthenticity\":true,\"certificateAwareness\":true}",
                "participantProfile": "{\"fullName\":\"Priya Sharma\"}"
            }),
        )
        .await;
    assert_eq!(response.status(), 201);
    let receipt = json_body(response).await;
    assert_eq!(receipt["registration"]["status"], "REGISTERED");
    assert_eq!(receipt["registration"]["headCount"], 1);
    assert_eq!(receipt["event"]["participantCount"], 1);
    assert_eq!(receipt["remainingCapacity"], 9);

    let duplicate = server.register(&student, &event_id).await;
    assert_eq!(duplicate.status(), 400);
    let body = json_body(duplicate).await;
    assert_eq!(body["error"]["code"], 1104);
    assert_eq!(body["error"]["details"], "already_registered");

    let detail = server
        .get_json(&format!("/api/v1/events/{event_id}"), Some(&student))
        .await;
    assert_eq!(detail["participantCount"], 1);
    assert_eq!(detail["myRegistration"]["registrationType"], "INDIVIDUAL");

    let mine = server
        .get_json("/api/v1/me/registrations", Some(&student))
        .await;
    assert_eq!(mine["data"].as_array().map(Vec::len), Some(1));

    let records = server
        .get_json(
            &format!("/api/v1/events/{event_id}/participants"),
            Some(&organizer),
        )
        .await;
    assert_eq!(records["participantCount"], 1);
    assert_eq!(
        records["data"][0]["participantProfile"]["fullName"],
        "Priya Sharma"
    );

    let peeking = send(
        server
            .client
            .get(server.url(&format!("/api/v1/events/{event_id}/participants")))
            .header("x-user-id", student.id.to_string()),
    )
    .await;
    assert_eq!(peeking.status(), 403);
}

#[tokio::test]
async fn eligibility_failures_are_forbidden() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let student = server.seed(UserRole::Student, 2).await;
    let event_id = server
        .published_event(&organizer, json!({"lastDate": "2020-01-01T00:00:00Z"}))
        .await;

    let response = server.register(&student, &event_id).await;
    assert_eq!(response.status(), 403);
    let body = json_body(response).await;
    assert_eq!(body["error"]["details"], "deadline_passed");

    let reopened = send(
        server
            .client
            .patch(server.url(&format!("/api/v1/events/{event_id}/registration")))
            .header("x-user-id", organizer.id.to_string())
            .json(&json!({"lastDate": null, "isOpen": false})),
    )
    .await;
    assert_eq!(reopened.status(), 200);

    let closed = server.register(&student, &event_id).await;
    assert_eq!(closed.status(), 403);
    let body = json_body(closed).await;
    assert_eq!(body["error"]["details"], "registration_closed");
}

#[tokio::test]
async fn config_patch_cannot_undercut_registrations() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let event_id = server
        .published_event(&organizer, json!({"maxParticipants": 5}))
        .await;
    for n in 0..2 {
        let student = server.seed(UserRole::Student, 10 + n).await;
        assert_eq!(server.register(&student, &event_id).await.status(), 201);
    }

    let patch = |body: Value| {
        server
            .client
            .patch(server.url(&format!("/api/v1/events/{event_id}/registration")))
            .header("x-user-id", organizer.id.to_string())
            .json(&body)
    };

    let below = send(patch(json!({"maxParticipants": 1}))).await;
    assert_eq!(below.status(), 400);

    let teams_only = send(patch(json!({"participationMode": "TEAM"}))).await;
    assert_eq!(teams_only.status(), 400);

    let exact = send(patch(json!({"maxParticipants": 2}))).await;
    assert_eq!(exact.status(), 200);
    let body = json_body(exact).await;
    assert_eq!(body["registration"]["maxParticipants"], 2);
    assert_eq!(body["participantCount"], 2);
}

#[tokio::test]
async fn draft_with_unknown_mode_is_rejected() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;

    let response = send(
        server
            .client
            .post(server.url("/api/v1/events"))
            .header("x-user-id", organizer.id.to_string())
            .json(&json!({"title": "Relay", "registration": {"participationMode": "TEEM"}})),
    )
    .await;
    assert!(response.status().is_client_error());

    let owned = server
        .get_json("/api/v1/organizer/events", Some(&organizer))
        .await;
    assert_eq!(owned["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn drafts_are_not_public() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;

    let created = server
        .create_event(&organizer, json!({"title": "Unannounced"}))
        .await;
    let Some(id) = created["id"].as_str() else {
        panic!("created event has no id: {created}");
    };
    assert_eq!(created["status"], "Draft");

    let anonymous = send(server.client.get(server.url(&format!("/api/v1/events/{id}")))).await;
    assert_eq!(anonymous.status(), 404);

    let owned = server
        .get_json("/api/v1/organizer/events", Some(&organizer))
        .await;
    assert_eq!(owned["data"][0]["id"], id);
}

#[tokio::test]
async fn malformed_body_is_a_profile_rejection() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let student = server.seed(UserRole::Student, 2).await;
    let event_id = server.published_event(&organizer, json!({})).await;

    let response = send(
        server
            .client
            .post(server.url(&format!("/api/v1/events/{event_id}/registrations")))
            .header("x-user-id", student.id.to_string())
            .header("content-type", "application/json")
            .body("{\"teamMembers\": ["),
    )
    .await;
    assert_eq!(response.status(), 400);
    let body = json_body(response).await;
    assert_eq!(body["error"]["details"], "invalid_profile");
}

#[tokio::test]
async fn self_service_profile_enables_registration() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let event_id = server.published_event(&organizer, json!({})).await;
    let newcomer = uuid::Uuid::new_v4();

    let stored = json_body(
        send(
            server
                .client
                .put(server.url("/api/v1/users/me"))
                .header("x-user-id", newcomer.to_string())
                .json(&json!({
                    "fullName": "Kiran Rao",
                    "email": "kiran@campus.edu",
                    "mobileNumber": "8123456789",
                    "collegeName": "Hill College",
                    "academicProfile": {"branch": "Civil", "year": "1"}
                })),
        )
        .await,
    )
    .await;
    assert_eq!(stored["role"], "STUDENT");

    let response = send(
        server
            .client
            .post(server.url(&format!("/api/v1/events/{event_id}/registrations")))
            .header("x-user-id", newcomer.to_string())
            .json(&accepted()),
    )
    .await;
    assert_eq!(response.status(), 201);
}

#[tokio::test]
async fn concurrent_requests_never_overfill() {
    let server = spawn_server().await;
    let organizer = server.seed(UserRole::Organizer, 1).await;
    let event_id = server
        .published_event(&organizer, json!({"maxParticipants": 3}))
        .await;

    let mut students = Vec::new();
    for n in 0..12 {
        students.push(server.seed(UserRole::Student, 100 + n).await);
    }

    let responses = join_all(
        students
            .iter()
            .map(|student| server.register(student, &event_id)),
    )
    .await;

    let created = responses.iter().filter(|r| r.status() == 201).count();
    let full = responses.iter().filter(|r| r.status() == 400).count();
    assert_eq!(created, 3);
    assert_eq!(full, 9);

    let detail = server
        .client
        .get(server.url(&format!("/api/v1/events/{event_id}")))
        .send()
        .await;
    let detail = json_body(assert_ok!(detail)).await;
    assert_eq!(detail["participantCount"], 3);
}
