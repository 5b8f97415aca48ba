//! Database models for users, items and trades, plus query inputs.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{ItemId, TradeId, TradeStatus, UserId};

/// Largest page a list query will return.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// A full `users` row, including the credential hash.
///
/// Never leaves the persistence layer; callers get a [`User`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct UserRecord {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
}

/// A registered user, without credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned identifier.
    pub id: UserId,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
        }
    }
}

/// A row from the `items` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Item {
    /// Store-assigned identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Owner's estimate of the item's value.
    pub price_estimate: Option<f64>,
    /// User who listed the item.
    pub owner_id: UserId,
}

/// A row from the `trades` table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Trade {
    /// Store-assigned identifier.
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

/// Registration input. The password is plaintext and hashed on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Listing input for a new item.
#[derive(Debug, Clone, Default)]
pub struct NewItem {
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional price estimate.
    pub price_estimate: Option<f64>,
}

/// Conjunctive item search filter. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    /// Case-insensitive substring matched against name or description.
    pub text: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    /// Exact owner.
    pub owner_id: Option<UserId>,
}

/// Offset pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Rows to skip.
    pub skip: u32,
    /// Maximum rows to return, at most [`MAX_PAGE_LIMIT`].
    pub limit: u32,
}

impl Page {
    /// Creates a page, clamping `limit` to [`MAX_PAGE_LIMIT`].
    #[must_use]
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip,
            limit: limit.min(MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, MAX_PAGE_LIMIT)
    }
}
