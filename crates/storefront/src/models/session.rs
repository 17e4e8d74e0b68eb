//! Session-stored types.
//!
//! The session record is the storefront's only local state: an opaque
//! key-value mirror of what the commerce API already knows, plus the two
//! deferred-intent slots (pending add, guest cart stash).

use serde::{Deserialize, Serialize};

use larkspur_core::{Email, ProductId, UserId};

use crate::commerce::CartLineInput;

/// Session-stored user identity plus bearer token.
///
/// Identity and token live in one value so that one is never present without
/// the other; login inserts the pair, logout removes the pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's commerce API ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// First name for display.
    pub first_name: String,
    /// Last name for display.
    pub last_name: String,
    /// Bearer token for authenticated commerce API calls.
    token: String,
}

impl CurrentUser {
    /// Create a session user from an authenticated identity.
    #[must_use]
    pub const fn new(
        id: UserId,
        email: Email,
        first_name: String,
        last_name: String,
        token: String,
    ) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            token,
        }
    }

    /// The bearer token for commerce API calls.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Display name, "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// The single deferred add-to-cart slot.
///
/// Written when an unauthenticated visitor tries to add to the cart (each
/// attempt overwrites the last - at most one survives), consumed immediately
/// after the next successful login or signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCartAdd {
    pub item_id: ProductId,
    pub quantity: u32,
}

impl From<PendingCartAdd> for CartLineInput {
    fn from(pending: PendingCartAdd) -> Self {
        Self::new(pending.item_id, pending.quantity)
    }
}

/// One line of a guest cart stash.
///
/// At logout, a non-empty cart is serialized into `Vec<StashedLine>` under a
/// key scoped to the user's ID; at that user's next login every line is
/// replayed against the server cart and the stash is deleted. Stashes for
/// different users never merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StashedLine {
    pub item_id: ProductId,
    pub quantity: u32,
}

impl From<StashedLine> for CartLineInput {
    fn from(line: StashedLine) -> Self {
        Self::new(line.item_id, line.quantity)
    }
}

/// Session keys for storefront state.
pub mod session_keys {
    use larkspur_core::UserId;

    /// Key for storing the current logged-in user (identity + token).
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the single pending guest add-to-cart.
    pub const PENDING_CART_ADD: &str = "pending_cart_add";

    /// User-scoped key for a stashed guest cart.
    ///
    /// Keyed per user so the stash only replays for the user who left it.
    #[must_use]
    pub fn guest_cart(user_id: UserId) -> String {
        format!("guest_cart_{user_id}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use larkspur_core::ProductId;

    use super::*;

    #[test]
    fn test_guest_cart_key_is_user_scoped() {
        assert_eq!(session_keys::guest_cart(UserId::new(7)), "guest_cart_7");
        assert_ne!(
            session_keys::guest_cart(UserId::new(1)),
            session_keys::guest_cart(UserId::new(2))
        );
    }

    #[test]
    fn test_current_user_serde_roundtrip() {
        let user = CurrentUser::new(
            UserId::new(42),
            Email::parse("user@example.com").unwrap(),
            "Ada".to_string(),
            "Lovelace".to_string(),
            "token-abc".to_string(),
        );

        let json = serde_json::to_string(&user).unwrap();
        let restored: CurrentUser = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.id, user.id);
        assert_eq!(restored.token(), "token-abc");
        assert_eq!(restored.full_name(), "Ada Lovelace");
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let user = CurrentUser::new(
            UserId::new(1),
            Email::parse("solo@example.com").unwrap(),
            "Cher".to_string(),
            String::new(),
            "t".to_string(),
        );
        assert_eq!(user.full_name(), "Cher");
    }

    #[test]
    fn test_stash_line_converts_to_cart_input() {
        let line = StashedLine {
            item_id: ProductId::new(3),
            quantity: 2,
        };
        let input: CartLineInput = line.into();
        assert_eq!(input, CartLineInput::new(ProductId::new(3), 2));
    }
}
