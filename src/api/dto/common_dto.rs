//! Shared DTO types used across multiple endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

use crate::persistence::Page;

/// Offset pagination query parameters for list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Rows to skip. Defaults to 0.
    #[serde(default)]
    pub skip: Option<u32>,
    /// Maximum rows to return (max 100). The default depends on the endpoint.
    #[serde(default)]
    pub limit: Option<u32>,
}

impl PageParams {
    /// Resolves the parameters into a clamped [`Page`].
    #[must_use]
    pub fn page(self, default_limit: u32) -> Page {
        Page::new(self.skip.unwrap_or(0), self.limit.unwrap_or(default_limit))
    }
}
