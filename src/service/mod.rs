//! Service layer: business logic orchestration.
//!
//! [`TradeService`] validates trade proposals, applies status transitions
//! through the [`crate::persistence::Store`], and pushes notifications
//! through the [`crate::domain::RoomRegistry`].

pub mod trade_service;

pub use trade_service::TradeService;
