//! SQLite implementation of the data access layer.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::Utc;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};

use super::models::{Item, ItemFilter, NewItem, NewUser, Page, Trade, User, UserRecord};
use crate::config::AppConfig;
use crate::credentials;
use crate::domain::{ItemId, TradeId, TradeStatus, UserId};
use crate::error::ApiError;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const USER_COLUMNS: &str = "id, username, email";
const ITEM_COLUMNS: &str = "id, name, description, price_estimate, owner_id";
const TRADE_COLUMNS: &str =
    "id, proposer_id, proposer_item_id, responder_id, responder_item_id, status, created_at";

/// SQLite-backed store using `sqlx::SqlitePool`.
///
/// Every method commits as a single statement; trade status changes use a
/// compare-and-set update so concurrent writers cannot both succeed.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Creates a store over an existing, already migrated pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the database named by `config`, creating the file if needed,
    /// and applies pending migrations.
    ///
    /// Connections use WAL journaling; a writer that finds the database
    /// locked waits up to the connect timeout before failing.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] if the URL is invalid or the
    /// database cannot be opened, and [`ApiError::Migration`] if the schema
    /// cannot be brought up to date.
    pub async fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.database_connect_timeout());
        let pool = SqlitePoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(config.database_connect_timeout())
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        tracing::info!(url = %config.database_url, "database ready");
        Ok(Self::new(pool))
    }

    /// Opens a private, migrated in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since each
    /// SQLite in-memory connection is a separate database.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the database cannot be created or migrated.
    pub async fn in_memory() -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        MIGRATOR.run(&pool).await?;
        Ok(Self::new(pool))
    }

    /// Checks that the database answers queries.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ── Users ───────────────────────────────────────────────────────────

    /// Looks up a user by email.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Looks up a user by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn get_user(&self, id: UserId) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Registers a user, hashing the password off the async runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] if the email or username is taken,
    /// or [`ApiError::Persistence`] on database failure.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User, ApiError> {
        if self.get_user_by_email(&new_user.email).await?.is_some() {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let NewUser {
            username,
            email,
            password,
        } = new_user;
        let hashed = tokio::task::spawn_blocking(move || credentials::hash_password(&password))
            .await
            .map_err(|e| ApiError::Internal(format!("hashing task failed: {e}")))??;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, email, hashed_password) VALUES (?, ?, ?) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&username)
        .bind(&email)
        .bind(hashed)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_constraint)?;

        tracing::info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Lists users in id order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn list_users(&self, page: Page) -> Result<Vec<User>, ApiError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    /// Deletes a user and, by cascade, its items and trades.
    ///
    /// Returns `true` if the user existed.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn delete_user(&self, id: UserId) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(user_id = %id, "user deleted");
        }
        Ok(deleted)
    }

    /// Returns the user whose email, or failing that username, equals
    /// `identifier`, provided `password` verifies.
    ///
    /// An unknown identifier and a wrong password both yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Option<User>, ApiError> {
        let mut record = self.user_record_where("email", identifier).await?;
        if record.is_none() {
            record = self.user_record_where("username", identifier).await?;
        }
        let Some(record) = record else {
            return Ok(None);
        };

        let password = password.to_owned();
        let stored = record.hashed_password.clone();
        let verified =
            tokio::task::spawn_blocking(move || credentials::verify_password(&password, &stored))
                .await
                .map_err(|e| ApiError::Internal(format!("verification task failed: {e}")))?;

        Ok(verified.then(|| User::from(record)))
    }

    async fn user_record_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<UserRecord>, ApiError> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT id, username, email, hashed_password FROM users WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    // ── Items ───────────────────────────────────────────────────────────

    /// Lists a new item owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::UserNotFound`] if the owner does not exist, or
    /// [`ApiError::Persistence`] on database failure.
    pub async fn create_item(&self, owner_id: UserId, new_item: NewItem) -> Result<Item, ApiError> {
        if self.get_user(owner_id).await?.is_none() {
            return Err(ApiError::UserNotFound(owner_id));
        }

        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items \
             (name, description, price_estimate, owner_id, name_folded, description_folded) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {ITEM_COLUMNS}"
        ))
        .bind(&new_item.name)
        .bind(&new_item.description)
        .bind(new_item.price_estimate)
        .bind(owner_id)
        .bind(fold_case(&new_item.name))
        .bind(fold_case(new_item.description.as_deref().unwrap_or_default()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::UserNotFound(owner_id)
            }
            other => ApiError::from(other),
        })?;

        tracing::info!(item_id = %item.id, owner_id = %owner_id, "item listed");
        Ok(item)
    }

    /// Looks up an item by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn get_item(&self, id: ItemId) -> Result<Option<Item>, ApiError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(item)
    }

    /// Deletes an item, returning the removed row.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn delete_item(&self, id: ItemId) -> Result<Option<Item>, ApiError> {
        let item = sqlx::query_as::<_, Item>(&format!(
            "DELETE FROM items WHERE id = ? RETURNING {ITEM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(item) = &item {
            tracing::info!(item_id = %item.id, "item deleted");
        }
        Ok(item)
    }

    /// Lists items in id order.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn list_items(&self, page: Page) -> Result<Vec<Item>, ApiError> {
        self.search_items(&ItemFilter::default(), page).await
    }

    /// Lists every item owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn list_items_by_owner(&self, owner_id: UserId) -> Result<Vec<Item>, ApiError> {
        let items = sqlx::query_as::<_, Item>(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id = ? ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    /// Fetches the items of several owners in one query, grouped by owner.
    ///
    /// Owners without items are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn items_for_owners(
        &self,
        owners: &[UserId],
    ) -> Result<HashMap<UserId, Vec<Item>>, ApiError> {
        if owners.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE owner_id IN ("
        ));
        let mut ids = qb.separated(", ");
        for owner in owners {
            ids.push_bind(*owner);
        }
        ids.push_unseparated(") ORDER BY id");

        let items: Vec<Item> = qb.build_query_as().fetch_all(&self.pool).await?;
        let mut grouped: HashMap<UserId, Vec<Item>> = HashMap::new();
        for item in items {
            grouped.entry(item.owner_id).or_default().push(item);
        }
        Ok(grouped)
    }

    /// Searches items with a conjunctive filter.
    ///
    /// Text matches case-insensitively, including non-ASCII letters, against
    /// the folded name and description columns.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn search_items(&self, filter: &ItemFilter, page: Page) -> Result<Vec<Item>, ApiError> {
        let mut qb =
            QueryBuilder::<Sqlite>::new(format!("SELECT {ITEM_COLUMNS} FROM items WHERE 1 = 1"));

        if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like(&fold_case(text)));
            qb.push(" AND (name_folded LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR description_folded LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
        if let Some(min) = filter.min_price {
            qb.push(" AND price_estimate >= ").push_bind(min);
        }
        if let Some(max) = filter.max_price {
            qb.push(" AND price_estimate <= ").push_bind(max);
        }
        if let Some(owner) = filter.owner_id {
            qb.push(" AND owner_id = ").push_bind(owner);
        }
        qb.push(" ORDER BY id LIMIT ")
            .push_bind(i64::from(page.limit))
            .push(" OFFSET ")
            .push_bind(i64::from(page.skip));

        let items = qb.build_query_as::<Item>().fetch_all(&self.pool).await?;
        Ok(items)
    }

    // ── Trades ──────────────────────────────────────────────────────────

    /// Records a new pending trade.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if a referenced user or item is
    /// missing, or [`ApiError::Persistence`] on database failure.
    pub async fn create_trade(
        &self,
        proposer_id: UserId,
        responder_id: UserId,
        proposer_item_id: ItemId,
        responder_item_id: ItemId,
    ) -> Result<Trade, ApiError> {
        let trade = sqlx::query_as::<_, Trade>(&format!(
            "INSERT INTO trades \
             (proposer_id, proposer_item_id, responder_id, responder_item_id, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {TRADE_COLUMNS}"
        ))
        .bind(proposer_id)
        .bind(proposer_item_id)
        .bind(responder_id)
        .bind(responder_item_id)
        .bind(TradeStatus::Pending)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                ApiError::InvalidRequest("trade references a missing user or item".to_string())
            }
            other => ApiError::from(other),
        })?;

        tracing::info!(trade_id = %trade.id, %proposer_id, %responder_id, "trade proposed");
        Ok(trade)
    }

    /// Looks up a trade by id.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn get_trade(&self, id: TradeId) -> Result<Option<Trade>, ApiError> {
        let trade = sqlx::query_as::<_, Trade>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(trade)
    }

    /// Lists trades the user proposed or received, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Persistence`] on database failure.
    pub async fn list_trades_for_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<Trade>, ApiError> {
        let trades = sqlx::query_as::<_, Trade>(&format!(
            "SELECT {TRADE_COLUMNS} FROM trades WHERE proposer_id = ? OR responder_id = ? \
             ORDER BY id DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(user_id)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(&self.pool)
        .await?;
        Ok(trades)
    }

    /// Moves a pending trade to a terminal status.
    ///
    /// The update only applies while the stored status is still pending,
    /// so of two concurrent updates exactly one succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::TradeNotFound`] if the trade does not exist,
    /// [`ApiError::InvalidTransition`] if the move is not allowed from the
    /// stored status, or [`ApiError::Persistence`] on database failure.
    pub async fn update_trade_status(
        &self,
        id: TradeId,
        status: TradeStatus,
    ) -> Result<Trade, ApiError> {
        if status.is_terminal() {
            let updated = sqlx::query_as::<_, Trade>(&format!(
                "UPDATE trades SET status = ? WHERE id = ? AND status = ? RETURNING {TRADE_COLUMNS}"
            ))
            .bind(status)
            .bind(id)
            .bind(TradeStatus::Pending)
            .fetch_optional(&self.pool)
            .await?;

            if let Some(trade) = updated {
                tracing::info!(trade_id = %id, %status, "trade status updated");
                return Ok(trade);
            }
        }

        let current = self
            .get_trade(id)
            .await?
            .ok_or(ApiError::TradeNotFound(id))?;
        current.status.transition(status)?;
        Err(ApiError::Internal(format!(
            "trade {id} is pending but could not be updated"
        )))
    }
}

/// Maps unique-constraint violations on `users` to [`ApiError::Conflict`].
fn map_user_constraint(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        let message = if db.message().contains("users.email") {
            "Email already registered"
        } else if db.message().contains("users.username") {
            "Username already taken"
        } else {
            "User already exists"
        };
        return ApiError::Conflict(message.to_string());
    }
    ApiError::from(err)
}

/// Case folding shared by stored search columns and search text.
///
/// SQLite's own `LOWER` only folds ASCII, so folding happens here.
fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Escapes LIKE wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
