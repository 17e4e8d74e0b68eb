//! Authentication route handlers.
//!
//! Login and signup call the commerce API's auth endpoints; the storefront
//! stores no credentials and verifies nothing itself. After any successful
//! authentication the session reconciliation runs (guest stash replay, then
//! the pending add) before the visitor lands back on the catalog, which
//! re-renders with authenticated button state and a fresh cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use larkspur_core::Email;

use crate::commerce::AuthSession;
use crate::error::{self, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, StashedLine, session_keys};
use crate::routes::{
    Flash, MessageQuery, UserView, redirect_with_error, redirect_with_info, redirect_with_success,
};
use crate::services::reconcile_cart_after_login;
use crate::state::AppState;

/// Minimum password length accepted at signup.
const MIN_PASSWORD_LENGTH: usize = 8;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub user: Option<UserView>,
    pub flash: Option<Flash>,
    pub providers: Vec<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub user: Option<UserView>,
    pub flash: Option<Flash>,
}

// =============================================================================
// Session Establishment
// =============================================================================

/// Store the authenticated identity and run post-login reconciliation.
///
/// Shared by password login, signup, and the OAuth callback. Order is fixed:
/// session first, then stash replay, then the pending add, then the caller
/// redirects into the catalog.
pub(crate) async fn establish_session(
    state: &AppState,
    session: &Session,
    auth: AuthSession,
    fallback_email: Email,
) -> error::Result<()> {
    // The API echoes the account email; fall back to the address the user
    // authenticated with if the echo is malformed.
    let email = Email::parse(&auth.email).unwrap_or(fallback_email);
    let user = CurrentUser::new(
        auth.user_id,
        email,
        auth.first_name,
        auth.last_name,
        auth.token,
    );

    set_current_user(session, &user).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    // The catalog is reloaded on the way out; drop the cached copy so the
    // post-login render reflects current server state.
    state.commerce().invalidate_catalog().await;

    let summary = reconcile_cart_after_login(state, session, &user).await;
    tracing::info!(
        user_id = %user.id,
        stashed_replayed = summary.stashed_replayed,
        stashed_skipped = summary.stashed_skipped,
        pending_added = summary.pending_added,
        "Session established"
    );

    Ok(())
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> LoginTemplate {
    // Provider buttons are cosmetic: no providers endpoint, no buttons.
    let providers = match state.commerce().oauth_providers().await {
        Ok(providers) => providers,
        Err(e) => {
            tracing::debug!("Failed to load OAuth providers: {e}");
            Vec::new()
        }
    };

    LoginTemplate {
        user: user.as_ref().map(UserView::from),
        flash: query.into_flash(),
        providers,
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> error::Result<Response> {
    let Ok(email) = Email::parse(&form.email) else {
        return Ok(
            redirect_with_error("/auth/login", "Please enter a valid email address")
                .into_response(),
        );
    };

    match state.commerce().login(email.as_str(), &form.password).await {
        Ok(auth) => {
            establish_session(&state, &session, auth, email).await?;
            Ok(redirect_with_success("/products", "Login successful!").into_response())
        }
        Err(e) => {
            tracing::warn!("Login failed: {e}");
            Ok(redirect_with_error(
                "/auth/login",
                &e.user_message("Login failed. Please try again."),
            )
            .into_response())
        }
    }
}

// =============================================================================
// Signup Routes
// =============================================================================

/// Display the signup page.
pub async fn signup_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> SignupTemplate {
    SignupTemplate {
        user: user.as_ref().map(UserView::from),
        flash: query.into_flash(),
    }
}

/// Handle signup form submission.
///
/// The API owns real validation; the checks here only catch what would
/// otherwise be a guaranteed round-trip failure.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> error::Result<Response> {
    if form.first_name.trim().is_empty() {
        return Ok(
            redirect_with_error("/auth/signup", "Please enter your name").into_response(),
        );
    }

    let Ok(email) = Email::parse(&form.email) else {
        return Ok(
            redirect_with_error("/auth/signup", "Please enter a valid email address")
                .into_response(),
        );
    };

    if form.password.len() < MIN_PASSWORD_LENGTH {
        return Ok(redirect_with_error(
            "/auth/signup",
            "Password must be at least 8 characters",
        )
        .into_response());
    }

    match state
        .commerce()
        .signup(
            form.first_name.trim(),
            form.last_name.trim(),
            email.as_str(),
            &form.password,
        )
        .await
    {
        Ok(auth) => {
            establish_session(&state, &session, auth, email).await?;
            Ok(
                redirect_with_success("/products", "Account created successfully!")
                    .into_response(),
            )
        }
        Err(e) => {
            tracing::warn!("Signup failed: {e}");
            Ok(redirect_with_error(
                "/auth/signup",
                &e.user_message("Signup failed. Please try again."),
            )
            .into_response())
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// A non-empty cart is stashed under a key scoped to this user, to be
/// replayed at their next login; stashing is best effort and never blocks
/// the logout. The session record survives - only the user key is removed.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> error::Result<Response> {
    if let Some(user) = &user {
        stash_guest_cart(&state, &session, user).await;
    }

    clear_current_user(&session).await?;
    clear_sentry_user();
    state.commerce().invalidate_catalog().await;

    Ok(redirect_with_info("/products", "Logged out successfully").into_response())
}

/// Serialize the server cart into this user's guest stash, best effort.
async fn stash_guest_cart(state: &AppState, session: &Session, user: &CurrentUser) {
    let lines = match state.commerce().cart(user.token()).await {
        Ok(lines) => lines,
        Err(e) => {
            tracing::warn!("Skipping guest cart stash, cart fetch failed: {e}");
            return;
        }
    };

    if lines.is_empty() {
        return;
    }

    let stash: Vec<StashedLine> = lines
        .iter()
        .map(|line| StashedLine {
            item_id: line.item.id,
            quantity: line.quantity,
        })
        .collect();

    let key = session_keys::guest_cart(user.id);
    match session.insert(&key, &stash).await {
        Ok(()) => tracing::debug!(lines = stash.len(), "Guest cart stashed"),
        Err(e) => tracing::warn!("Failed to stash guest cart: {e}"),
    }
}
