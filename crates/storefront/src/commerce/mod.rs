//! Commerce REST API client.
//!
//! # Architecture
//!
//! - The commerce API is source of truth - NO local sync, direct REST calls
//! - Per-user bearer tokens (issued at login) authenticate all cart endpoints
//! - In-memory caching via `moka` for the unfiltered catalog and the category
//!   list; filtered catalog queries always go to the API
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /auth/login`, `POST /auth/signup` - issue a bearer token
//! - `GET /auth/oauth2/providers` - enabled OAuth providers
//! - `{oauth_root}/oauth2/authorization/{provider}` - browser redirect target
//!
//! ## Catalog
//! - `GET /items` (optional query: `category`, `name`, `minPrice`, `maxPrice`)
//! - `GET /items/categories`
//!
//! ## Cart (bearer token required)
//! - `GET /cart`, `POST /cart/add`, `PUT /cart/update`,
//!   `DELETE /cart/remove/{itemId}`, `DELETE /cart/clear`, `POST /cart/checkout`
//!
//! # Example
//!
//! ```rust,ignore
//! use larkspur_storefront::commerce::{CartLineInput, CatalogFilter, CommerceClient};
//!
//! let client = CommerceClient::new(&config.commerce);
//!
//! // Browse the catalog
//! let items = client.items(&CatalogFilter::default()).await?;
//!
//! // Authenticate and add to the cart
//! let auth = client.login("user@example.com", "hunter2!").await?;
//! client
//!     .add_to_cart(&auth.token, &CartLineInput::new(items[0].id, 1))
//!     .await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    ///
    /// `message` is taken from a JSON `{"message": ...}` body when the API
    /// sends one, otherwise from the raw body text.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-supplied error message.
        message: String,
    },

    /// A 2xx response body failed to parse as the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CommerceError {
    /// A message suitable for showing to the end user.
    ///
    /// Server-authored messages from [`CommerceError::Api`] pass through;
    /// transport and parse failures fall back to the caller's wording, since
    /// their `Display` output is diagnostic, not user-facing.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Api { message, .. } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = CommerceError::Api {
            status: 409,
            message: "Email already registered".to_string(),
        };
        assert_eq!(err.to_string(), "API error (409): Email already registered");
    }

    #[test]
    fn test_user_message_prefers_server_text() {
        let err = CommerceError::Api {
            status: 400,
            message: "Invalid credentials".to_string(),
        };
        assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    }

    #[test]
    fn test_user_message_falls_back_for_empty_body() {
        let err = CommerceError::Api {
            status: 500,
            message: String::new(),
        };
        assert_eq!(err.user_message("Login failed"), "Login failed");
    }

    #[test]
    fn test_user_message_falls_back_for_parse_errors() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CommerceError::Parse(parse_err);
        assert_eq!(
            err.user_message("Failed to load products"),
            "Failed to load products"
        );
    }
}
