//! Trade service: validates proposals, applies transitions, notifies rooms.

use chrono::Utc;

use crate::domain::{ItemId, RoomRegistry, TradeEvent, TradeId, TradeStatus, UserId, user_room};
use crate::error::ApiError;
use crate::persistence::{Page, Store, Trade};
use crate::ws::messages::WsMessage;

/// Orchestration layer for trade operations.
///
/// Stateless coordinator: owns a [`Store`] handle for persistence and a
/// [`RoomRegistry`] handle for notifications. Every mutation follows the
/// pattern: validate → write through the store → notify both participants
/// → return result.
#[derive(Debug, Clone)]
pub struct TradeService {
    store: Store,
    rooms: RoomRegistry,
}

impl TradeService {
    /// Creates a new `TradeService`.
    #[must_use]
    pub fn new(store: Store, rooms: RoomRegistry) -> Self {
        Self { store, rooms }
    }

    /// Proposes swapping `proposer_item_id` for `responder_item_id`.
    ///
    /// The responder is whoever owns the requested item.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::ItemNotFound`] if the requested item does not
    /// exist, plus every error of [`TradeService::create_trade`].
    pub async fn propose(
        &self,
        proposer_id: UserId,
        proposer_item_id: ItemId,
        responder_item_id: ItemId,
    ) -> Result<Trade, ApiError> {
        let responder_item = self
            .store
            .get_item(responder_item_id)
            .await?
            .ok_or(ApiError::ItemNotFound(responder_item_id))?;

        self.create_trade(
            proposer_id,
            responder_item.owner_id,
            proposer_item_id,
            responder_item_id,
        )
        .await
    }

    /// Records a pending trade between two users and notifies both.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] or [`ApiError::ItemNotFound`] for
    /// missing references, and [`ApiError::InvalidRequest`] if an item is
    /// not owned by the side offering it or both sides are the same user.
    pub async fn create_trade(
        &self,
        proposer_id: UserId,
        responder_id: UserId,
        proposer_item_id: ItemId,
        responder_item_id: ItemId,
    ) -> Result<Trade, ApiError> {
        for user_id in [proposer_id, responder_id] {
            if self.store.get_user(user_id).await?.is_none() {
                return Err(ApiError::UserNotFound(user_id));
            }
        }
        if proposer_id == responder_id {
            return Err(ApiError::InvalidRequest(
                "cannot propose a trade to yourself".to_string(),
            ));
        }

        for (item_id, expected_owner) in [
            (proposer_item_id, proposer_id),
            (responder_item_id, responder_id),
        ] {
            let item = self
                .store
                .get_item(item_id)
                .await?
                .ok_or(ApiError::ItemNotFound(item_id))?;
            if item.owner_id != expected_owner {
                return Err(ApiError::InvalidRequest(format!(
                    "item {item_id} is not owned by user {expected_owner}"
                )));
            }
        }

        let trade = self
            .store
            .create_trade(proposer_id, responder_id, proposer_item_id, responder_item_id)
            .await?;

        self.notify(&TradeEvent::TradeProposed {
            trade_id: trade.id,
            proposer_id,
            proposer_item_id,
            responder_id,
            responder_item_id,
            timestamp: trade.created_at,
        })
        .await;

        Ok(trade)
    }

    /// Returns a trade by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TradeNotFound`] if the trade does not exist.
    pub async fn get_trade(&self, trade_id: TradeId) -> Result<Trade, ApiError> {
        self.store
            .get_trade(trade_id)
            .await?
            .ok_or(ApiError::TradeNotFound(trade_id))
    }

    /// Moves a pending trade to `status` and notifies both participants.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TradeNotFound`] or [`ApiError::InvalidTransition`].
    pub async fn update_status(
        &self,
        trade_id: TradeId,
        status: TradeStatus,
    ) -> Result<Trade, ApiError> {
        let trade = self.store.update_trade_status(trade_id, status).await?;

        self.notify(&TradeEvent::TradeStatusChanged {
            trade_id: trade.id,
            proposer_id: trade.proposer_id,
            responder_id: trade.responder_id,
            status: trade.status,
            timestamp: Utc::now(),
        })
        .await;

        Ok(trade)
    }

    /// Lists trades the user is part of, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] if the user does not exist.
    pub async fn trades_for_user(&self, user_id: UserId, page: Page) -> Result<Vec<Trade>, ApiError> {
        if self.store.get_user(user_id).await?.is_none() {
            return Err(ApiError::UserNotFound(user_id));
        }
        self.store.list_trades_for_user(user_id, page).await
    }

    /// Broadcasts `event` to the personal rooms of both participants.
    ///
    /// Returns the number of connections reached.
    async fn notify(&self, event: &TradeEvent) -> usize {
        let frame = match WsMessage::event(event).and_then(|msg| msg.to_json()) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode trade event");
                return 0;
            }
        };

        let mut delivered = 0;
        for user_id in event.participants() {
            delivered += self.rooms.broadcast(&user_room(user_id), &frame).await;
        }
        tracing::debug!(
            trade_id = %event.trade_id(),
            event_type = event.event_type(),
            delivered,
            "trade event published"
        );
        delivered
    }
}
