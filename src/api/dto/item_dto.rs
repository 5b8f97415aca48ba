//! Item DTOs for listing, retrieval and search.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ItemId, UserId};
use crate::error::ApiError;
use crate::persistence::{Item, ItemFilter, NewItem, Page};

/// Maximum item name length.
pub const MAX_ITEM_NAME_LEN: usize = 150;

/// Request body for `POST /users/{id}/items/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateItemRequest {
    /// Display name (1–150 chars).
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional price estimate.
    #[serde(default)]
    pub price_estimate: Option<f64>,
}

impl CreateItemRequest {
    /// Validates the request and converts it into a [`NewItem`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a blank or overlong name or
    /// a negative price.
    pub fn into_new_item(self) -> Result<NewItem, ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::InvalidRequest("name must not be empty".to_string()));
        }
        if self.name.chars().count() > MAX_ITEM_NAME_LEN {
            return Err(ApiError::InvalidRequest(format!(
                "name must be at most {MAX_ITEM_NAME_LEN} characters"
            )));
        }
        if self.price_estimate.is_some_and(|p| p < 0.0) {
            return Err(ApiError::InvalidRequest(
                "price_estimate must not be negative".to_string(),
            ));
        }
        Ok(NewItem {
            name: self.name,
            description: self.description,
            price_estimate: self.price_estimate,
        })
    }
}

/// Item representation returned by every item endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    /// Item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Price estimate.
    pub price_estimate: Option<f64>,
    /// Owning user.
    pub owner_id: UserId,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            price_estimate: item.price_estimate,
            owner_id: item.owner_id,
        }
    }
}

/// Query parameters for `GET /items/search`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemSearchParams {
    /// Case-insensitive text matched against name or description.
    #[serde(default)]
    pub q: Option<String>,
    /// Inclusive lower price bound.
    #[serde(default)]
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Restrict to one owner.
    #[serde(default)]
    #[param(value_type = Option<i64>)]
    pub owner_id: Option<UserId>,
    /// Rows to skip. Defaults to 0.
    #[serde(default)]
    pub skip: Option<u32>,
    /// Maximum rows to return (max 100). Defaults to 100.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl ItemSearchParams {
    /// Splits the parameters into a store filter and a page.
    #[must_use]
    pub fn into_query(self) -> (ItemFilter, Page) {
        let page = Page::new(self.skip.unwrap_or(0), self.limit.unwrap_or(100));
        let filter = ItemFilter {
            text: self.q,
            min_price: self.min_price,
            max_price: self.max_price,
            owner_id: self.owner_id,
        };
        (filter, page)
    }
}
