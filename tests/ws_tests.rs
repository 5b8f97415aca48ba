//! WebSocket room tests: chat relay and trade notifications.

#![allow(clippy::panic, clippy::indexing_slicing)]

mod common;

use std::time::Duration;

use common::TestApp;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(app: &TestApp, room: &str) -> Client {
    let Ok((socket, _)) = connect_async(app.ws_url(room)).await else {
        panic!("ws connect to {room} failed");
    };
    socket
}

async fn next_text(socket: &mut Client) -> String {
    loop {
        let Ok(frame) = tokio::time::timeout(Duration::from_secs(5), socket.next()).await else {
            panic!("timed out waiting for a frame");
        };
        match frame {
            Some(Ok(Message::Text(text))) => return text.as_str().to_string(),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

#[tokio::test]
async fn text_is_relayed_to_every_room_member() {
    let app = TestApp::spawn().await;
    let mut first = connect(&app, "garage-sale").await;
    let mut second = connect(&app, "garage-sale").await;
    let mut outsider = connect(&app, "elsewhere").await;
    app.wait_for_room("garage-sale", 2).await;
    app.wait_for_room("elsewhere", 1).await;

    let Ok(()) = first.send(Message::text("anyone want a lamp?")).await else {
        panic!("send failed");
    };

    assert_eq!(next_text(&mut second).await, "anyone want a lamp?");
    assert_eq!(next_text(&mut first).await, "anyone want a lamp?");

    let quiet = tokio::time::timeout(Duration::from_millis(100), outsider.next()).await;
    assert!(quiet.is_err(), "other rooms must not receive the message");
}

#[tokio::test]
async fn closed_socket_leaves_room() {
    let app = TestApp::spawn().await;
    let mut socket = connect(&app, "lobby").await;
    app.wait_for_room("lobby", 1).await;

    let Ok(()) = socket.close(None).await else {
        panic!("close failed");
    };
    app.wait_for_room("lobby", 0).await;
}

#[tokio::test]
async fn trade_events_reach_participants_rooms() {
    let app = TestApp::spawn().await;
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let lamp = app.add_item(alice, "Lamp", None, None).await;
    let desk = app.add_item(bob, "Desk", None, None).await;

    let bob_room = format!("user-{bob}");
    let mut bob_socket = connect(&app, &bob_room).await;
    app.wait_for_room(&bob_room, 1).await;

    let (status, trade) = app
        .post(
            &format!("/users/{alice}/trades/"),
            json!({"proposer_item_id": lamp, "responder_item_id": desk}),
        )
        .await;
    assert_eq!(status, 201);

    let Ok(proposed) = serde_json::from_str::<Value>(&next_text(&mut bob_socket).await) else {
        panic!("notification is not JSON");
    };
    assert_eq!(proposed["type"], "event");
    assert_eq!(proposed["payload"]["event_type"], "trade_proposed");
    assert_eq!(proposed["payload"]["trade_id"], trade["id"]);
    assert_eq!(proposed["payload"]["proposer_id"], alice);

    let (status, _) = app
        .patch(
            &format!("/trades/{}", trade["id"]),
            json!({"status": "accepted"}),
        )
        .await;
    assert_eq!(status, 200);

    let Ok(changed) = serde_json::from_str::<Value>(&next_text(&mut bob_socket).await) else {
        panic!("notification is not JSON");
    };
    assert_eq!(changed["payload"]["event_type"], "trade_status_changed");
    assert_eq!(changed["payload"]["status"], "accepted");
}
