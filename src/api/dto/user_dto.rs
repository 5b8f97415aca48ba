//! User DTOs for registration, login and listing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::item_dto::ItemResponse;
use crate::domain::UserId;
use crate::error::ApiError;
use crate::persistence::{Item, NewUser, User};

/// Maximum username length.
pub const MAX_USERNAME_LEN: usize = 50;
/// Maximum email length.
pub const MAX_EMAIL_LEN: usize = 255;

/// Request body for `POST /users/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Unique username (1–50 chars).
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Plaintext password; stored only as a hash.
    pub password: String,
}

impl CreateUserRequest {
    /// Validates the request and converts it into a [`NewUser`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] for a blank or overlong
    /// username, a malformed email, or an empty password.
    pub fn into_new_user(self) -> Result<NewUser, ApiError> {
        let username = self.username.trim();
        if username.is_empty() || username.chars().count() > MAX_USERNAME_LEN {
            return Err(ApiError::InvalidRequest(format!(
                "username must be 1 to {MAX_USERNAME_LEN} characters"
            )));
        }
        let email = self.email.trim();
        if !is_plausible_email(email) {
            return Err(ApiError::InvalidRequest(format!(
                "invalid email address: {email}"
            )));
        }
        if self.password.is_empty() {
            return Err(ApiError::InvalidRequest(
                "password must not be empty".to_string(),
            ));
        }
        Ok(NewUser {
            username: username.to_string(),
            email: email.to_string(),
            password: self.password,
        })
    }
}

/// Accepts `local@domain.tld` shapes without whitespace.
fn is_plausible_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}

/// Request body for `POST /login/`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address or username.
    pub identifier: String,
    /// Plaintext password.
    pub password: String,
}

/// User representation. The password hash is never included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// User identifier.
    pub id: UserId,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Items the user has listed.
    pub items: Vec<ItemResponse>,
}

impl UserResponse {
    /// Builds the representation of `user` with its `items`.
    #[must_use]
    pub fn new(user: User, items: Vec<Item>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            items: items.into_iter().map(ItemResponse::from).collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> CreateUserRequest {
        CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn valid_request_is_trimmed() {
        let Ok(new_user) = request(" alice ", "alice@example.com ", "pw").into_new_user() else {
            panic!("expected valid request");
        };
        assert_eq!(new_user.username, "alice");
        assert_eq!(new_user.email, "alice@example.com");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["", "alice", "@example.com", "alice@", "alice@host", "a b@c.d", "a@b@c.d"] {
            assert!(
                request("alice", email, "pw").into_new_user().is_err(),
                "{email:?} should be rejected"
            );
        }
    }

    #[test]
    fn username_and_password_are_required() {
        assert!(request("", "a@b.c", "pw").into_new_user().is_err());
        assert!(request(&"u".repeat(51), "a@b.c", "pw").into_new_user().is_err());
        assert!(request("alice", "a@b.c", "").into_new_user().is_err());
    }
}
