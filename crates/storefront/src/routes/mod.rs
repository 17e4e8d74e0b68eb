//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to the catalog
//! GET  /health                 - Health check (in main.rs)
//!
//! # Catalog
//! GET  /products               - Product listing (query: category, name,
//!                                min_price, max_price)
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (guests: record pending add,
//!                                redirect to login)
//! POST /cart/update            - Set line quantity (0 removes)
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Empty the cart
//! POST /cart/checkout          - Place the order
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/signup            - Signup page
//! POST /auth/signup            - Signup action
//! POST /auth/logout            - Logout action (stashes a non-empty cart)
//! GET  /auth/oauth/{provider}  - Redirect to the API's OAuth authorization
//! GET  /auth/callback          - OAuth redirect-back handling
//! ```
//!
//! Navigating to a view is what loads it: each GET handler fetches whatever
//! that view renders, and every mutation redirects back into a view. Flash
//! notifications ride along as `error`/`success`/`info` query parameters and
//! render as a transient banner.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod oauth;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::{Deserialize, Deserializer};

use crate::middleware::{auth_rate_limiter, cart_rate_limiter};
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Flash Notifications
// =============================================================================

/// A transient notification rendered once on the next page view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    /// One of "error", "success", "info" - doubles as the banner CSS class.
    pub kind: &'static str,
    pub text: String,
}

/// Flash message query parameters, shared by every page.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    #[serde(default, deserialize_with = "empty_to_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub success: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub info: Option<String>,
}

impl MessageQuery {
    /// The flash to display; error outranks success outranks info.
    #[must_use]
    pub fn into_flash(self) -> Option<Flash> {
        flash_from(self.error, self.success, self.info)
    }
}

/// Build a flash from the three message parameters.
pub(crate) fn flash_from(
    error: Option<String>,
    success: Option<String>,
    info: Option<String>,
) -> Option<Flash> {
    if let Some(text) = error {
        return Some(Flash { kind: "error", text });
    }
    if let Some(text) = success {
        return Some(Flash { kind: "success", text });
    }
    info.map(|text| Flash { kind: "info", text })
}

fn flash_url(path: &str, param: &str, message: &str) -> String {
    format!("{path}?{param}={}", urlencoding::encode(message))
}

pub(crate) fn redirect_with_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&flash_url(path, "error", message))
}

pub(crate) fn redirect_with_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&flash_url(path, "success", message))
}

pub(crate) fn redirect_with_info(path: &str, message: &str) -> Redirect {
    Redirect::to(&flash_url(path, "info", message))
}

/// Deserialize an optional query/form field, treating "" as absent.
///
/// HTML forms submit untouched inputs as empty strings; the catalog filter
/// and flash parameters must treat those as unset.
pub(crate) fn empty_to_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => s.parse::<T>().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Shared View Data
// =============================================================================

/// Signed-in user data for the page header.
#[derive(Debug, Clone)]
pub struct UserView {
    pub name: String,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            name: user.full_name(),
        }
    }
}

// =============================================================================
// Routers
// =============================================================================

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/", get(catalog::index))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/checkout", post(cart::checkout))
        .route("/count", get(cart::count))
        .layer(cart_rate_limiter())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        // Commerce API OAuth
        .route("/oauth/{provider}", get(oauth::authorize))
        .route("/callback", get(oauth::callback))
        .layer(auth_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // The catalog is the landing view
        .route("/", get(root))
        .nest("/products", catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/auth", auth_routes())
}

async fn root() -> Redirect {
    Redirect::to("/products")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_priority_error_first() {
        let flash = flash_from(
            Some("boom".to_string()),
            Some("yay".to_string()),
            Some("fyi".to_string()),
        )
        .expect("flash");
        assert_eq!(flash.kind, "error");
        assert_eq!(flash.text, "boom");

        let flash = flash_from(None, Some("yay".to_string()), Some("fyi".to_string()))
            .expect("flash");
        assert_eq!(flash.kind, "success");

        assert!(flash_from(None, None, None).is_none());
    }

    #[test]
    fn test_flash_url_encodes_message() {
        assert_eq!(
            flash_url("/auth/login", "info", "Please login to add items to cart"),
            "/auth/login?info=Please%20login%20to%20add%20items%20to%20cart"
        );
    }

    #[test]
    fn test_empty_to_none_in_query_shapes() {
        #[derive(Deserialize)]
        struct Q {
            #[serde(default, deserialize_with = "empty_to_none")]
            name: Option<String>,
        }

        let q: Q = serde_json::from_str(r#"{"name":""}"#).expect("parse");
        assert!(q.name.is_none());

        let q: Q = serde_json::from_str(r#"{"name":"mug"}"#).expect("parse");
        assert_eq!(q.name.as_deref(), Some("mug"));

        let q: Q = serde_json::from_str("{}").expect("parse");
        assert!(q.name.is_none());
    }
}
