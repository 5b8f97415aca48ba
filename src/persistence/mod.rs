//! Persistence layer: SQLite storage for users, items and trades.
//!
//! [`Store`] wraps a `sqlx::SqlitePool` and exposes typed operations; the
//! schema ships as embedded migrations applied on connect.

pub mod models;
pub mod sqlite;

pub use models::{Item, ItemFilter, MAX_PAGE_LIMIT, NewItem, NewUser, Page, Trade, User};
pub use sqlite::Store;
