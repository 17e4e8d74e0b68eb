//! Domain models for storefront.
//!
//! The commerce API owns every durable entity (users, products, carts,
//! orders). What lives here is the storefront's own per-visitor state: the
//! values mirrored into the session store.

pub mod session;

pub use session::{CurrentUser, PendingCartAdd, StashedLine, session_keys};
