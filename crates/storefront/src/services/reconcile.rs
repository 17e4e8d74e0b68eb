//! Post-login cart reconciliation.
//!
//! When a user authenticates (password login, signup, or OAuth callback),
//! two pieces of deferred intent may be waiting in the session:
//!
//! 1. A guest cart stash left by this same user's previous logout - every
//!    line is replayed against the server cart as an independent add call.
//!    There is no batching and no rollback: a line that fails is logged and
//!    skipped, and the stash is deleted regardless, so nothing replays twice.
//! 2. The single pending add recorded when a guest pressed "add to cart" -
//!    the slot is cleared before the add is attempted, so a failure is
//!    surfaced in logs but never retried.
//!
//! Order matters and is stash first, pending add second; the server cart is
//! the sole source of truth and is trusted to reject or tolerate duplicates.

use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use crate::commerce::CartLineInput;
use crate::models::{CurrentUser, PendingCartAdd, StashedLine, session_keys};
use crate::state::AppState;

/// What a reconciliation run actually did, for logging.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Stashed lines successfully replayed into the server cart.
    pub stashed_replayed: usize,
    /// Stashed lines skipped because their add call failed.
    pub stashed_skipped: usize,
    /// Whether a pending guest add was performed.
    pub pending_added: bool,
}

/// Replay the guest cart stash and the pending add after authentication.
///
/// Best-effort by contract: every failure degrades to a log line, never to an
/// error for the caller - the login itself has already succeeded.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn reconcile_cart_after_login(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();

    replay_guest_stash(state, session, user, &mut summary).await;
    consume_pending_add(state, session, user, &mut summary).await;

    summary
}

/// Replay this user's stash, if one exists, then delete it.
async fn replay_guest_stash(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    summary: &mut ReconcileSummary,
) {
    let key = session_keys::guest_cart(user.id);

    let stash: Vec<StashedLine> = match session.get(&key).await {
        Ok(Some(lines)) => lines,
        Ok(None) => return,
        Err(e) => {
            warn!("Failed to read guest cart stash: {e}");
            return;
        }
    };

    for line in &stash {
        let input = CartLineInput::from(*line);
        match state.commerce().add_to_cart(user.token(), &input).await {
            Ok(()) => summary.stashed_replayed += 1,
            Err(e) => {
                // No rollback and no retry: the line is dropped.
                warn!(item_id = %input.item_id, "Skipping stashed cart line: {e}");
                summary.stashed_skipped += 1;
            }
        }
    }

    // Delete the stash whether or not every line made it - a partial stash
    // must not replay again at the next login.
    if let Err(e) = session.remove::<Vec<StashedLine>>(&key).await {
        warn!("Failed to remove guest cart stash: {e}");
    }

    debug!(
        replayed = summary.stashed_replayed,
        skipped = summary.stashed_skipped,
        "Guest cart stash replayed"
    );
}

/// Perform and clear the single pending guest add, if one exists.
async fn consume_pending_add(
    state: &AppState,
    session: &Session,
    user: &CurrentUser,
    summary: &mut ReconcileSummary,
) {
    let pending: PendingCartAdd = match session
        .remove(session_keys::PENDING_CART_ADD)
        .await
    {
        Ok(Some(pending)) => pending,
        Ok(None) => return,
        Err(e) => {
            warn!("Failed to read pending cart add: {e}");
            return;
        }
    };

    // The slot is already cleared: a failed add is logged, not retried.
    let input = CartLineInput::from(pending);
    match state.commerce().add_to_cart(user.token(), &input).await {
        Ok(()) => {
            summary.pending_added = true;
            debug!(item_id = %input.item_id, "Pending guest add applied");
        }
        Err(e) => {
            warn!(item_id = %input.item_id, "Pending guest add failed: {e}");
        }
    }
}
