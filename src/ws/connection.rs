//! WebSocket connection loop.
//!
//! Registers the socket in its room, drains the room's outbound queue into
//! the socket, and relays text frames from the client to the whole room.

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::{Connection, RoomRegistry};

/// Runs the read/write loop for a single WebSocket connection in `room`.
///
/// - A writer task forwards queued frames to the client. If it stops, or
///   falls so far behind that the queue fills, the registry prunes the
///   connection on its next broadcast.
/// - Text frames from the client are broadcast to every member of `room`.
pub async fn run_connection(socket: WebSocket, room: String, rooms: RoomRegistry) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (connection, mut outbound) = Connection::channel();
    let connection_id = connection.id();
    rooms.connect(&room, connection).await;
    tracing::debug!(%room, connection = %connection_id, "ws connection opened");

    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if ws_tx.send(Message::text(text)).await.is_err() {
                break;
            }
        }
    });

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let delivered = rooms.broadcast(&room, text.as_str()).await;
                        tracing::trace!(%room, delivered, "relayed client message");
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Writer stopped: the client is gone
            _ = &mut writer => break,
        }
    }

    rooms.disconnect(&room, connection_id).await;
    writer.abort();
    tracing::debug!(%room, connection = %connection_id, "ws connection closed");
}
