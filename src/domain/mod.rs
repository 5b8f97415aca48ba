//! Domain layer: identifiers, trade lifecycle, and the connection registry.
//!
//! This module contains the server-side domain model: typed entity ids,
//! the canonical [`TradeStatus`] state machine, trade notifications, and
//! the room-partitioned [`RoomRegistry`] used for live broadcasts.

pub mod ids;
pub mod room_registry;
pub mod trade_event;
pub mod trade_status;

pub use ids::{ItemId, TradeId, UserId};
pub use room_registry::{Connection, ConnectionId, OUTBOUND_QUEUE_CAPACITY, RoomRegistry};
pub use trade_event::{TradeEvent, user_room};
pub use trade_status::TradeStatus;
