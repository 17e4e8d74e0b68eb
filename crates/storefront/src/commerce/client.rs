//! Commerce REST API client implementation.
//!
//! Uses `reqwest` for HTTP with JSON bodies. The unfiltered catalog and the
//! category list are cached using `moka` (5-minute TTL); everything else is
//! fetched fresh on every call because it is either user-specific (cart) or
//! credential-bearing (auth).

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use larkspur_core::ProductId;

use crate::commerce::CommerceError;
use crate::commerce::cache::{CacheKey, CacheValue};
use crate::commerce::types::{AuthSession, CartLine, CartLineInput, CatalogFilter, Product};
use crate::config::CommerceApiConfig;

/// Catalog cache TTL.
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignupRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
    password: &'a str,
}

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cheaply cloneable; all clones share one connection pool and one catalog
/// cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    api_url: String,
    oauth_url: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    #[must_use]
    pub fn new(config: &CommerceApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(CACHE_TTL)
            .build();

        Self {
            inner: Arc::new(CommerceClientInner {
                client: reqwest::Client::new(),
                api_url: config.api_url.clone(),
                oauth_url: config.oauth_url.clone(),
                cache,
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.api_url)
    }

    /// Send a request and parse a JSON body.
    async fn request<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CommerceError> {
        let body = self.request_text(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }

    /// Send a request whose response body carries no data the storefront uses.
    async fn request_unit(&self, request: reqwest::RequestBuilder) -> Result<(), CommerceError> {
        self.request_text(request).await.map(|_| ())
    }

    /// Send a request, map non-2xx statuses to `CommerceError::Api`, and
    /// return the raw body text.
    async fn request_text(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, CommerceError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = extract_error_message(&body);
        debug!(status = %status, message = %message, "commerce API returned non-success status");
        Err(CommerceError::Api {
            status: status.as_u16(),
            message,
        })
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Authenticate with email and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, CommerceError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        self.request(request).await
    }

    /// Create an account and authenticate in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn signup(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, CommerceError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/signup"))
            .json(&SignupRequest {
                first_name,
                last_name,
                email,
                password,
            });
        self.request(request).await
    }

    /// List the OAuth providers the API has enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn oauth_providers(&self) -> Result<Vec<String>, CommerceError> {
        let request = self.inner.client.get(self.url("/auth/oauth2/providers"));
        self.request(request).await
    }

    /// The browser redirect target that starts an OAuth sign-in.
    ///
    /// The provider completes the flow by redirecting back to the storefront
    /// with identity parameters in the query string.
    #[must_use]
    pub fn authorization_url(&self, provider: &str) -> String {
        format!("{}/oauth2/authorization/{provider}", self.inner.oauth_url)
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Fetch the item list, optionally filtered.
    ///
    /// The unfiltered list is served from the in-memory cache when warm, so a
    /// "clear filters" navigation re-renders from the last full fetch.
    /// Filtered queries always hit the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn items(&self, filter: &CatalogFilter) -> Result<Vec<Product>, CommerceError> {
        // Check cache (only for the unfiltered catalog)
        if filter.is_empty()
            && let Some(CacheValue::Items(items)) = self.inner.cache.get(&CacheKey::Items).await
        {
            debug!("Cache hit for items");
            return Ok(items);
        }

        let mut request = self.inner.client.get(self.url("/items"));
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            request = request.query(&pairs);
        }

        let items: Vec<Product> = self.request(request).await?;

        if filter.is_empty() {
            self.inner
                .cache
                .insert(CacheKey::Items, CacheValue::Items(items.clone()))
                .await;
        }

        Ok(items)
    }

    /// Fetch the category list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, CommerceError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let request = self.inner.client.get(self.url("/items/categories"));
        let categories: Vec<String> = self.request(request).await?;

        self.inner
            .cache
            .insert(CacheKey::Categories, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Drop all cached catalog data so the next load re-fetches wholesale.
    ///
    /// Called when authentication state changes: the catalog view is reloaded
    /// after login/logout and must reflect current server state.
    pub async fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }

    // =========================================================================
    // Cart Methods (not cached - user-specific mutable state)
    // =========================================================================

    /// Fetch the authenticated user's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn cart(&self, token: &str) -> Result<Vec<CartLine>, CommerceError> {
        let request = self.inner.client.get(self.url("/cart")).bearer_auth(token);
        self.request(request).await
    }

    /// Add a line to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the add (e.g., insufficient stock).
    #[instrument(skip(self, token), fields(item_id = %line.item_id, quantity = line.quantity))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        line: &CartLineInput,
    ) -> Result<(), CommerceError> {
        let request = self
            .inner
            .client
            .post(self.url("/cart/add"))
            .bearer_auth(token)
            .json(line);
        self.request_unit(request).await
    }

    /// Set the quantity of an existing cart line.
    ///
    /// Callers must not send quantity 0; a decrement to zero is a removal and
    /// goes through [`Self::remove_from_cart`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the update.
    #[instrument(skip(self, token), fields(item_id = %line.item_id, quantity = line.quantity))]
    pub async fn update_cart(
        &self,
        token: &str,
        line: &CartLineInput,
    ) -> Result<(), CommerceError> {
        let request = self
            .inner
            .client
            .put(self.url("/cart/update"))
            .bearer_auth(token)
            .json(line);
        self.request_unit(request).await
    }

    /// Remove a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the removal.
    #[instrument(skip(self, token), fields(item_id = %item_id))]
    pub async fn remove_from_cart(
        &self,
        token: &str,
        item_id: ProductId,
    ) -> Result<(), CommerceError> {
        let request = self
            .inner
            .client
            .delete(self.url(&format!("/cart/remove/{item_id}")))
            .bearer_auth(token);
        self.request_unit(request).await
    }

    /// Remove every line from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the clear.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &str) -> Result<(), CommerceError> {
        let request = self
            .inner
            .client
            .delete(self.url("/cart/clear"))
            .bearer_auth(token);
        self.request_unit(request).await
    }

    /// Convert the cart into an order.
    ///
    /// Order processing is entirely server-side; on success the server cart
    /// is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if checkout is rejected (e.g., stock changed).
    #[instrument(skip(self, token))]
    pub async fn checkout(&self, token: &str) -> Result<(), CommerceError> {
        let request = self
            .inner
            .client
            .post(self.url("/cart/checkout"))
            .bearer_auth(token);
        self.request_unit(request).await
    }
}

/// Pull a human-readable message out of an error response body.
///
/// The API usually sends `{"message": "..."}` but some endpoints answer with
/// plain text. Long bodies are truncated; HTML error pages from intermediary
/// proxies are not worth relaying to users.
fn extract_error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }

    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('<') {
        return String::new();
    }

    trimmed.chars().take(200).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> CommerceClient {
        CommerceClient::new(&CommerceApiConfig {
            api_url: "http://localhost:8085/api".to_string(),
            oauth_url: "http://localhost:8085".to_string(),
        })
    }

    #[test]
    fn test_url_joining() {
        let client = test_client();
        assert_eq!(client.url("/items"), "http://localhost:8085/api/items");
        assert_eq!(
            client.url("/cart/remove/3"),
            "http://localhost:8085/api/cart/remove/3"
        );
    }

    #[test]
    fn test_authorization_url() {
        let client = test_client();
        assert_eq!(
            client.authorization_url("google"),
            "http://localhost:8085/oauth2/authorization/google"
        );
    }

    #[test]
    fn test_extract_error_message_json() {
        assert_eq!(
            extract_error_message(r#"{"message":"Invalid credentials"}"#),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_extract_error_message_plain_text() {
        assert_eq!(
            extract_error_message("Item is out of stock"),
            "Item is out of stock"
        );
    }

    #[test]
    fn test_extract_error_message_empty_and_html() {
        assert_eq!(extract_error_message(""), "");
        assert_eq!(extract_error_message("   "), "");
        assert_eq!(extract_error_message("<html><body>502</body></html>"), "");
    }

    #[test]
    fn test_extract_error_message_truncates() {
        let long = "x".repeat(1000);
        assert_eq!(extract_error_message(&long).len(), 200);
    }
}
