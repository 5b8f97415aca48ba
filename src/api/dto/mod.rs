//! Data Transfer Objects for REST request/response serialization.
//!
//! Response DTOs mirror the persisted rows but never expose credentials;
//! request DTOs carry their own field validation.

pub mod common_dto;
pub mod item_dto;
pub mod trade_dto;
pub mod user_dto;

pub use common_dto::*;
pub use item_dto::*;
pub use trade_dto::*;
pub use user_dto::*;
