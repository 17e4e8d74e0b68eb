//! Integration tests for Larkspur.
//!
//! These tests drive a *running* storefront over HTTP, which in turn talks
//! to a running commerce API and a `PostgreSQL` session store. They are all
//! `#[ignore]`d so `cargo test` stays green without that stack.
//!
//! # Running Tests
//!
//! ```bash
//! # Start postgres, the commerce API, and the storefront, then:
//! cargo test -p larkspur-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` - storefront under test (default: <http://localhost:3000>)
//! - `STOREFRONT_TEST_EMAIL` / `STOREFRONT_TEST_PASSWORD` - a valid account
//!   on the commerce API, required by the login/reconciliation tests

use reqwest::Client;

/// Base URL for the storefront under test (configurable via environment).
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Test account credentials, if configured.
#[must_use]
pub fn test_credentials() -> Option<(String, String)> {
    let email = std::env::var("STOREFRONT_TEST_EMAIL").ok()?;
    let password = std::env::var("STOREFRONT_TEST_PASSWORD").ok()?;
    Some((email, password))
}

/// A browser-like client: cookie store on, redirects followed.
///
/// # Panics
///
/// Panics if the client cannot be constructed (test-only code).
#[must_use]
pub fn browser_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A client that surfaces redirects instead of following them, for
/// asserting on `Location` headers.
///
/// # Panics
///
/// Panics if the client cannot be constructed (test-only code).
#[must_use]
pub fn no_redirect_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Log the browser client in through the storefront's login form.
///
/// # Panics
///
/// Panics if the login request fails outright (test-only code).
pub async fn login(client: &Client, email: &str, password: &str) {
    let base_url = storefront_base_url();
    let resp = client
        .post(format!("{base_url}/auth/login"))
        .form(&[("email", email), ("password", password)])
        .send()
        .await
        .expect("Failed to post login form");
    assert!(
        resp.status().is_success() || resp.status().is_redirection(),
        "login failed with status {}",
        resp.status()
    );
}
