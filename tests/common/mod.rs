//! Shared harness: runs the full router on an ephemeral port.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use serde_json::{Value, json};
use swapstop::api;
use swapstop::app_state::AppState;
use swapstop::domain::RoomRegistry;
use swapstop::persistence::Store;

/// A running server backed by a private in-memory database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub rooms: RoomRegistry,
    pub client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let Ok(store) = Store::in_memory().await else {
            panic!("in-memory store");
        };
        let rooms = RoomRegistry::new();
        let app = api::build_app(
            AppState::new(store, rooms.clone()),
            Duration::from_secs(30),
        );

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind ephemeral port");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            rooms,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self, room: &str) -> String {
        format!("ws://{}/ws/{room}", self.addr)
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for an empty body).
    pub async fn call(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> (u16, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let Ok(response) = request.send().await else {
            panic!("request to {path} failed");
        };
        let status = response.status().as_u16();
        let Ok(text) = response.text().await else {
            panic!("reading body of {path} failed");
        };
        let value = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };
        (status, value)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        self.call(reqwest::Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> (u16, Value) {
        self.call(reqwest::Method::POST, path, Some(body)).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> (u16, Value) {
        self.call(reqwest::Method::PATCH, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        self.call(reqwest::Method::DELETE, path, None).await
    }

    /// Registers `name` with email `name@example.com`; returns the user id.
    pub async fn register(&self, name: &str) -> i64 {
        let (status, body) = self
            .post(
                "/users/",
                json!({"username": name, "email": format!("{name}@example.com"), "password": "s3cret!"}),
            )
            .await;
        assert_eq!(status, 200, "register {name}: {body}");
        let Some(id) = body["id"].as_i64() else {
            panic!("user id missing: {body}");
        };
        id
    }

    /// Lists an item for `owner`; returns the item id.
    pub async fn add_item(&self, owner: i64, name: &str, description: Option<&str>, price: Option<f64>) -> i64 {
        let (status, body) = self
            .post(
                &format!("/users/{owner}/items/"),
                json!({"name": name, "description": description, "price_estimate": price}),
            )
            .await;
        assert_eq!(status, 200, "add item {name}: {body}");
        let Some(id) = body["id"].as_i64() else {
            panic!("item id missing: {body}");
        };
        id
    }

    /// Waits until `room` has `size` members.
    pub async fn wait_for_room(&self, room: &str, size: usize) {
        for _ in 0..200 {
            if self.rooms.room_size(room).await == size {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("room {room} never reached {size} members");
    }
}

/// Names of the items in a JSON array response.
pub fn names(body: &Value) -> Vec<String> {
    body.as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
