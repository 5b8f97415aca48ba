//! Trade notifications pushed to participants' rooms.
//!
//! Every trade mutation produces a [`TradeEvent`]. The trade service wraps
//! it in a WebSocket envelope and broadcasts it to the personal room of
//! each participant (see [`user_room`]).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{ItemId, TradeId, TradeStatus, UserId};

/// Name of the personal notification room of a user.
#[must_use]
pub fn user_room(user_id: UserId) -> String {
    format!("user-{user_id}")
}

/// Domain event emitted after a trade is created or changes status.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TradeEvent {
    /// A new trade was proposed.
    TradeProposed {
        /// Trade identifier.
        trade_id: TradeId,
        /// User who made the offer.
        proposer_id: UserId,
        /// Item offered by the proposer.
        proposer_item_id: ItemId,
        /// User the offer is addressed to.
        responder_id: UserId,
        /// Item requested from the responder.
        responder_item_id: ItemId,
        /// Proposal timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A pending trade reached a terminal status.
    TradeStatusChanged {
        /// Trade identifier.
        trade_id: TradeId,
        /// User who made the offer.
        proposer_id: UserId,
        /// User the offer is addressed to.
        responder_id: UserId,
        /// New status.
        status: TradeStatus,
        /// Transition timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl TradeEvent {
    /// Returns the trade this event refers to.
    #[must_use]
    pub const fn trade_id(&self) -> TradeId {
        match self {
            Self::TradeProposed { trade_id, .. } | Self::TradeStatusChanged { trade_id, .. } => {
                *trade_id
            }
        }
    }

    /// Returns both participants of the trade.
    #[must_use]
    pub const fn participants(&self) -> [UserId; 2] {
        match self {
            Self::TradeProposed {
                proposer_id,
                responder_id,
                ..
            }
            | Self::TradeStatusChanged {
                proposer_id,
                responder_id,
                ..
            } => [*proposer_id, *responder_id],
        }
    }

    /// Returns the event type string (e.g. `"trade_proposed"`).
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::TradeProposed { .. } => "trade_proposed",
            Self::TradeStatusChanged { .. } => "trade_status_changed",
        }
    }
}
