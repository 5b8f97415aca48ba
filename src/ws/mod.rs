//! WebSocket layer: room endpoint, connection loop, message envelope.
//!
//! The endpoint at `/ws/{room}` joins the caller to a broadcast room of
//! the [`crate::domain::RoomRegistry`].

pub mod connection;
pub mod handler;
pub mod messages;
