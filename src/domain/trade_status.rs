//! Trade lifecycle states and the transitions between them.
//!
//! A trade is created `pending` and may move exactly once, to one of the
//! terminal states `accepted`, `rejected` or `cancelled`. This enum is the
//! only definition of the status: its JSON, SQL and text forms all use the
//! same lowercase names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ApiError;

/// Status of a trade proposal.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TradeStatus {
    /// Awaiting a response. The only non-terminal state.
    #[default]
    Pending,
    /// The responder agreed to the exchange.
    Accepted,
    /// The responder declined the exchange.
    Rejected,
    /// The proposal was withdrawn.
    Cancelled,
}

impl TradeStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::Cancelled,
    ];

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for states a trade can never leave.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns `true` if a trade in `self` may move to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(self, Self::Pending) && next.is_terminal()
    }

    /// Validates the move from `self` to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidTransition`] unless `self` is pending and
    /// `next` is terminal.
    pub fn transition(self, next: Self) -> Result<Self, ApiError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ApiError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ApiError::InvalidRequest(format!("unknown trade status: {s}")))
    }
}
