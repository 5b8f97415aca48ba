//! Axum WebSocket upgrade handler.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;

/// `GET /ws/{room}` — Upgrade HTTP connection to WebSocket and join `room`.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(room): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let rooms = state.rooms.clone();
    ws.on_upgrade(move |socket| run_connection(socket, room, rooms))
}
