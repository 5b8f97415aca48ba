//! End-to-end HTTP tests against a live router on an ephemeral port.

#![allow(clippy::panic, clippy::indexing_slicing, clippy::unwrap_used)]

mod common;

use common::{TestApp, names};
use serde_json::json;

#[tokio::test]
async fn registration_rejects_duplicates_and_lists_with_items() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    app.add_item(alice, "Lamp", None, Some(20.0)).await;

    let (status, body) = app
        .post(
            "/users/",
            json!({"username": "alice2", "email": "alice@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1002);

    let (status, _) = app
        .post(
            "/users/",
            json!({"username": "alice", "email": "other@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, 400);

    let (status, body) = app.get("/users/").await;
    assert_eq!(status, 200);
    let Some(users) = body.as_array() else {
        panic!("expected array: {body}");
    };
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "alice");
    assert_eq!(names(&users[0]["items"]), vec!["Lamp"]);
    assert!(users[0].get("hashed_password").is_none());
    assert!(users[0].get("password").is_none());
}

#[tokio::test]
async fn invalid_registration_payload_is_bad_request() {
    let app = TestApp::spawn().await;
    let (status, body) = app
        .post(
            "/users/",
            json!({"username": "  ", "email": "x@example.com", "password": "pw"}),
        )
        .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1001);
}

#[tokio::test]
async fn user_list_is_paginated() {
    let app = TestApp::spawn().await;
    for name in ["u1", "u2", "u3"] {
        app.register(name).await;
    }

    let (_, page) = app.get("/users/?skip=1&limit=1").await;
    let Some(users) = page.as_array() else {
        panic!("expected array: {page}");
    };
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["username"], "u2");
}

#[tokio::test]
async fn deleting_user_cascades_to_items() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    let lamp = app.add_item(alice, "Lamp", None, None).await;

    let (status, body) = app.delete(&format!("/users/{alice}")).await;
    assert_eq!(status, 204);
    assert!(body.is_null());

    let (status, _) = app.get(&format!("/items/{lamp}")).await;
    assert_eq!(status, 404);

    let (status, body) = app.delete(&format!("/users/{alice}")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn item_lifecycle() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;

    let (status, _) = app
        .post("/users/999/items/", json!({"name": "Ghost"}))
        .await;
    assert_eq!(status, 404);
    let (status, _) = app.get("/users/999/items/").await;
    assert_eq!(status, 404);

    let (status, _) = app
        .post(
            &format!("/users/{alice}/items/"),
            json!({"name": "Lamp", "price_estimate": -1.0}),
        )
        .await;
    assert_eq!(status, 400);

    let lamp = app
        .add_item(alice, "Lamp", Some("brass desk lamp"), Some(25.0))
        .await;

    let (status, body) = app.get(&format!("/items/{lamp}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["name"], "Lamp");
    assert_eq!(body["owner_id"], alice);
    assert_eq!(body["description"], "brass desk lamp");

    let (_, owned) = app.get(&format!("/users/{alice}/items/")).await;
    assert_eq!(names(&owned), vec!["Lamp"]);

    let (status, body) = app.delete(&format!("/items/{lamp}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], lamp);

    let (status, body) = app.get(&format!("/items/{lamp}")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2002);
    let (status, _) = app.delete(&format!("/items/{lamp}")).await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn search_combines_filters() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    app.add_item(alice, "Oak chair", None, Some(40.0)).await;
    app.add_item(alice, "Table", Some("comes with a CHAIR"), Some(120.0))
        .await;
    app.add_item(bob, "Armchair", None, Some(60.0)).await;
    app.add_item(bob, "Bike", None, None).await;

    let (status, body) = app.get("/items/search?q=chair").await;
    assert_eq!(status, 200);
    assert_eq!(names(&body), vec!["Oak chair", "Table", "Armchair"]);

    let (_, body) = app.get("/items/search?q=chair&max_price=100").await;
    assert_eq!(names(&body), vec!["Oak chair", "Armchair"]);

    let (_, body) = app
        .get(&format!("/items/search?q=chair&min_price=50&owner_id={bob}"))
        .await;
    assert_eq!(names(&body), vec!["Armchair"]);

    let (_, body) = app.get("/items/search").await;
    assert_eq!(names(&body).len(), 4);

    let (_, body) = app.get("/items/?limit=2").await;
    assert_eq!(names(&body), vec!["Oak chair", "Table"]);
}

#[tokio::test]
async fn login_by_email_or_username() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    app.add_item(alice, "Lamp", None, None).await;

    let (status, body) = app
        .post(
            "/login/",
            json!({"identifier": "alice@example.com", "password": "s3cret!"}),
        )
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["id"], alice);
    assert_eq!(names(&body["items"]), vec!["Lamp"]);

    let (status, body) = app
        .post("/login/", json!({"identifier": "alice", "password": "s3cret!"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["username"], "alice");

    let (status, body) = app
        .post("/login/", json!({"identifier": "alice", "password": "nope"}))
        .await;
    assert_eq!(status, 401);
    assert_eq!(body["error"]["code"], 1003);

    let (status, _) = app
        .post("/login/", json!({"identifier": "nobody", "password": "s3cret!"}))
        .await;
    assert_eq!(status, 401);
}

#[tokio::test]
async fn trade_lifecycle_over_http() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let lamp = app.add_item(alice, "Lamp", None, None).await;
    let desk = app.add_item(bob, "Desk", None, None).await;

    let (status, trade) = app
        .post(
            &format!("/users/{alice}/trades/"),
            json!({"proposer_item_id": lamp, "responder_item_id": desk}),
        )
        .await;
    assert_eq!(status, 201, "{trade}");
    assert_eq!(trade["status"], "pending");
    assert_eq!(trade["responder_id"], bob);
    let Some(trade_id) = trade["id"].as_i64() else {
        panic!("trade id missing: {trade}");
    };

    let (status, body) = app.get(&format!("/trades/{trade_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(body["proposer_item_id"], lamp);

    let (_, listed) = app.get(&format!("/users/{bob}/trades/")).await;
    assert_eq!(listed.as_array().map(Vec::len), Some(1));

    let (status, body) = app
        .patch(&format!("/trades/{trade_id}"), json!({"status": "accepted"}))
        .await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "accepted");

    let (status, body) = app
        .patch(&format!("/trades/{trade_id}"), json!({"status": "rejected"}))
        .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], 2004);

    let (status, _) = app
        .patch("/trades/4242", json!({"status": "accepted"}))
        .await;
    assert_eq!(status, 404);
    let (status, _) = app.get("/trades/4242").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn trade_proposal_validation() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let lamp = app.add_item(alice, "Lamp", None, None).await;
    let desk = app.add_item(bob, "Desk", None, None).await;

    let (status, _) = app
        .post(
            &format!("/users/{alice}/trades/"),
            json!({"proposer_item_id": desk, "responder_item_id": lamp}),
        )
        .await;
    assert_eq!(status, 400);

    let (status, _) = app
        .post(
            &format!("/users/{alice}/trades/"),
            json!({"proposer_item_id": lamp, "responder_item_id": 999}),
        )
        .await;
    assert_eq!(status, 404);

    let (status, _) = app.get("/users/999/trades/").await;
    assert_eq!(status, 404);
}

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::spawn().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "ok");
}
