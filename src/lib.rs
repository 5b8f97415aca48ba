//! # swapstop
//!
//! REST API and WebSocket backend for a peer-to-peer item trading app.
//!
//! Users register, list items, search the catalogue, and propose trades of
//! one item for another. Trades are `pending` until the other side accepts
//! or rejects them (or the proposer cancels). Participants are notified in
//! real time through per-user WebSocket rooms.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── TradeService (service/)
//!     ├── RoomRegistry, TradeStatus (domain/)
//!     │
//!     └── SQLite Store (persistence/)
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
