//! Trade DTOs for proposals and status changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ItemId, TradeId, TradeStatus, UserId};
use crate::persistence::Trade;

/// Request body for `POST /users/{id}/trades/`.
///
/// The path user is the proposer; the responder is the owner of
/// `responder_item_id`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTradeRequest {
    /// Item the proposer offers.
    pub proposer_item_id: ItemId,
    /// Item the proposer wants in return.
    pub responder_item_id: ItemId,
}

/// Request body for `PATCH /trades/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTradeStatusRequest {
    /// Target status: `accepted`, `rejected` or `cancelled`.
    pub status: TradeStatus,
}

/// Trade representation returned by every trade endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TradeResponse {
    /// Trade identifier.
    pub id: TradeId,
    /// User who made the offer.
    pub proposer_id: UserId,
    /// Item offered by the proposer.
    pub proposer_item_id: ItemId,
    /// User the offer is addressed to.
    pub responder_id: UserId,
    /// Item requested from the responder.
    pub responder_item_id: ItemId,
    /// Lifecycle status.
    pub status: TradeStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Trade> for TradeResponse {
    fn from(trade: Trade) -> Self {
        Self {
            id: trade.id,
            proposer_id: trade.proposer_id,
            proposer_item_id: trade.proposer_item_id,
            responder_id: trade.responder_id,
            responder_item_id: trade.responder_item_id,
            status: trade.status,
            created_at: trade.created_at,
        }
    }
}
