//! Domain services for storefront.

pub mod reconcile;

pub use reconcile::{ReconcileSummary, reconcile_cart_after_login};
