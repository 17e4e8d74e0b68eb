//! OAuth route handlers.
//!
//! The commerce API owns the whole OAuth dance: the storefront redirects the
//! browser to the API's authorization endpoint, and the API redirects back
//! to `/auth/callback` carrying either an identity (token, email, names,
//! user ID) or an error in the query string. There is no code exchange and
//! no client secret on this side.

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use larkspur_core::{Email, UserId};

use crate::commerce::AuthSession;
use crate::error;
use crate::routes::auth::establish_session;
use crate::routes::{redirect_with_error, redirect_with_info, redirect_with_success};
use crate::state::AppState;

/// Query parameters on the redirect back from the commerce API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackQuery {
    pub token: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub user_id: Option<String>,
    /// Error code if the provider or the API rejected the sign-in.
    pub error: Option<String>,
}

/// Start an OAuth sign-in by redirecting to the API's authorization endpoint.
///
/// # Route
///
/// `GET /auth/oauth/{provider}`
#[instrument(skip(state))]
pub async fn authorize(State(state): State<AppState>, Path(provider): Path<String>) -> Redirect {
    Redirect::to(&state.commerce().authorization_url(&provider))
}

/// Handle the redirect back from the commerce API.
///
/// Three outcomes: an explicit error parameter surfaces as a notification on
/// the login page; a complete identity establishes the session (with the
/// same stash/pending reconciliation as password login); anything else is a
/// malformed redirect and lands back on the login page.
///
/// # Route
///
/// `GET /auth/callback`
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> error::Result<Response> {
    if let Some(code) = query.error {
        tracing::warn!("OAuth sign-in failed: {code}");
        return Ok(
            redirect_with_error("/auth/login", &format!("Sign-in failed: {code}"))
                .into_response(),
        );
    }

    let (Some(token), Some(email), Some(first_name), Some(last_name), Some(user_id)) = (
        query.token,
        query.email,
        query.first_name,
        query.last_name,
        query.user_id,
    ) else {
        tracing::warn!("OAuth redirect missing required parameters");
        return Ok(
            redirect_with_info("/auth/login", "Sign-in was cancelled or incomplete")
                .into_response(),
        );
    };

    let Ok(user_id) = user_id.parse::<UserId>() else {
        tracing::warn!("OAuth redirect carried a non-numeric user ID");
        return Ok(
            redirect_with_error("/auth/login", "Sign-in response was malformed")
                .into_response(),
        );
    };

    let Ok(parsed_email) = Email::parse(&email) else {
        tracing::warn!("OAuth redirect carried an invalid email");
        return Ok(
            redirect_with_error("/auth/login", "Sign-in response was malformed")
                .into_response(),
        );
    };

    let auth = AuthSession {
        user_id,
        email,
        first_name,
        last_name,
        token,
    };
    establish_session(&state, &session, auth, parsed_email).await?;

    Ok(redirect_with_success("/products", "Login successful!").into_response())
}
