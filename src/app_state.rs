//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::RoomRegistry;
use crate::persistence::Store;
use crate::service::TradeService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Data access for users and items.
    pub store: Store,
    /// Trade service for proposals and status changes.
    pub trades: Arc<TradeService>,
    /// Live WebSocket rooms.
    pub rooms: RoomRegistry,
}

impl AppState {
    /// Wires the trade service to `store` and `rooms`.
    #[must_use]
    pub fn new(store: Store, rooms: RoomRegistry) -> Self {
        let trades = Arc::new(TradeService::new(store.clone(), rooms.clone()));
        Self {
            store,
            trades,
            rooms,
        }
    }
}
