//! Cart route handlers.
//!
//! The cart view is purely a projection of the last fetched server cart:
//! totals are computed here from the fetched lines and never re-verified
//! against a server-computed total. Mutations post back to the storefront,
//! call the API, and redirect into a view; two rapid mutations can race and
//! the server's last write wins.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use larkspur_core::{Price, ProductId};

use crate::commerce::{CartLine, CartLineInput};
use crate::error;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{PendingCartAdd, session_keys};
use crate::routes::{
    Flash, MessageQuery, UserView, redirect_with_error, redirect_with_info, redirect_with_success,
};
use crate::state::AppState;

// =============================================================================
// View Models
// =============================================================================

/// Cart line display data for templates.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub item_id: ProductId,
    pub name: String,
    pub category: String,
    pub price: String,
    pub quantity: u32,
    pub line_total: String,
    pub image_url: Option<String>,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            item_id: line.item.id,
            name: line.item.name.clone(),
            category: line.item.category.clone(),
            price: line.item.unit_price().display(),
            quantity: line.quantity,
            line_total: line.line_total().display(),
            image_url: line.item.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total_amount: String,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items: 0,
            total_amount: Price::usd(Decimal::ZERO).display(),
        }
    }

    /// Project fetched cart lines into display data, totals included.
    #[must_use]
    pub fn from_lines(lines: &[CartLine]) -> Self {
        let total_items = lines.iter().map(|line| line.quantity).sum();
        let total_amount: Decimal = lines
            .iter()
            .map(|line| line.item.price * Decimal::from(line.quantity))
            .sum();

        Self {
            items: lines.iter().map(CartItemView::from).collect(),
            total_items,
            total_amount: Price::usd(total_amount).display(),
        }
    }
}

// =============================================================================
// Forms
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub item_id: ProductId,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub item_id: ProductId,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub item_id: ProductId,
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub user: Option<UserView>,
    pub flash: Option<Flash>,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
///
/// Guests and failed fetches both render the empty cart.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> CartTemplate {
    let cart = match &user {
        Some(user) => match state.commerce().cart(user.token()).await {
            Ok(lines) => CartView::from_lines(&lines),
            Err(e) => {
                tracing::warn!("Failed to fetch cart: {e}");
                CartView::empty()
            }
        },
        None => CartView::empty(),
    };

    CartTemplate {
        user: user.as_ref().map(UserView::from),
        flash: query.into_flash(),
        cart,
    }
}

/// Add an item to the cart.
///
/// Guests don't add: the attempt is recorded as the single pending add
/// (overwriting any earlier one) and the visitor is sent to the login page.
/// The add replays right after the next successful login.
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> error::Result<Response> {
    let quantity = form.quantity.unwrap_or(1).max(1);

    let Some(user) = user else {
        let pending = PendingCartAdd {
            item_id: form.item_id,
            quantity,
        };
        session
            .insert(session_keys::PENDING_CART_ADD, pending)
            .await?;
        return Ok(
            redirect_with_info("/auth/login", "Please login to add items to cart")
                .into_response(),
        );
    };

    let item_id = form.item_id.to_string();
    error::add_breadcrumb("cart", "Add to cart", Some(&[("item_id", item_id.as_str())]));

    let line = CartLineInput::new(form.item_id, quantity);
    let response = match state.commerce().add_to_cart(user.token(), &line).await {
        Ok(()) => redirect_with_success("/products", "Item added to cart!"),
        Err(e) => {
            tracing::warn!("Failed to add item to cart: {e}");
            redirect_with_error(
                "/products",
                &e.user_message("Failed to add item to cart"),
            )
        }
    };

    Ok(response.into_response())
}

/// Set a cart line's quantity.
///
/// Quantity 0 is defined to be a removal: the API never sees an update call
/// carrying quantity 0.
#[instrument(skip(state, user))]
pub async fn update(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let Some(user) = user else {
        return Redirect::to("/cart").into_response();
    };

    if form.quantity == 0 {
        return remove_item(&state, user.token(), form.item_id).await;
    }

    let line = CartLineInput::new(form.item_id, form.quantity);
    match state.commerce().update_cart(user.token(), &line).await {
        Ok(()) => Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::warn!("Failed to update cart item: {e}");
            redirect_with_error("/cart", "Failed to update cart item").into_response()
        }
    }
}

/// Remove an item from the cart.
#[instrument(skip(state, user))]
pub async fn remove(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let Some(user) = user else {
        return Redirect::to("/cart").into_response();
    };

    remove_item(&state, user.token(), form.item_id).await
}

async fn remove_item(state: &AppState, token: &str, item_id: ProductId) -> Response {
    match state.commerce().remove_from_cart(token, item_id).await {
        Ok(()) => redirect_with_info("/cart", "Item removed from cart").into_response(),
        Err(e) => {
            tracing::warn!("Failed to remove item from cart: {e}");
            redirect_with_error("/cart", "Failed to remove item from cart").into_response()
        }
    }
}

/// Empty the cart.
///
/// Clearing an already-empty cart is a silent no-op, matching the view's
/// hidden clear control in that state.
#[instrument(skip(state, user))]
pub async fn clear(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> Response {
    let Some(user) = user else {
        return Redirect::to("/cart").into_response();
    };

    let is_empty = state
        .commerce()
        .cart(user.token())
        .await
        .map(|lines| lines.is_empty())
        .unwrap_or(true);
    if is_empty {
        return Redirect::to("/cart").into_response();
    }

    match state.commerce().clear_cart(user.token()).await {
        Ok(()) => redirect_with_info("/cart", "Cart cleared").into_response(),
        Err(e) => {
            tracing::warn!("Failed to clear cart: {e}");
            redirect_with_error("/cart", "Failed to clear cart").into_response()
        }
    }
}

/// Place the order.
///
/// Checkout on an empty (or unavailable) cart is an error notification, not
/// an API call. Order processing itself is entirely server-side.
#[instrument(skip(state, user))]
pub async fn checkout(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> Response {
    let Some(user) = user else {
        return redirect_with_error("/cart", "Your cart is empty!").into_response();
    };

    let is_empty = state
        .commerce()
        .cart(user.token())
        .await
        .map(|lines| lines.is_empty())
        .unwrap_or(true);
    if is_empty {
        return redirect_with_error("/cart", "Your cart is empty!").into_response();
    }

    error::add_breadcrumb("cart", "Checkout", None);

    match state.commerce().checkout(user.token()).await {
        Ok(()) => {
            redirect_with_success("/products", "Order placed successfully!").into_response()
        }
        Err(e) => {
            tracing::warn!("Checkout failed: {e}");
            redirect_with_error("/cart", &e.user_message("Checkout failed. Try again."))
                .into_response()
        }
    }
}

/// Cart count badge fragment.
#[instrument(skip(state, user))]
pub async fn count(State(state): State<AppState>, OptionalAuth(user): OptionalAuth) -> CartCountTemplate {
    let count = match &user {
        Some(user) => state
            .commerce()
            .cart(user.token())
            .await
            .map(|lines| lines.iter().map(|line| line.quantity).sum())
            .unwrap_or(0),
        None => 0,
    };

    CartCountTemplate { count }
}

#[cfg(test)]
mod tests {
    use larkspur_core::ProductId;

    use crate::commerce::Product;

    use super::*;

    fn line(id: i64, price: Decimal, quantity: u32) -> CartLine {
        CartLine {
            item: Product {
                id: ProductId::new(id),
                name: format!("Item {id}"),
                category: String::new(),
                description: String::new(),
                price,
                stock: 10,
                image_url: None,
            },
            quantity,
        }
    }

    #[test]
    fn test_totals_from_fetched_lines() {
        // [{item:{id:1,price:10},quantity:2},{item:{id:2,price:5},quantity:1}]
        let lines = vec![
            line(1, Decimal::from(10), 2),
            line(2, Decimal::from(5), 1),
        ];
        let cart = CartView::from_lines(&lines);

        assert_eq!(cart.total_items, 3);
        assert_eq!(cart.total_amount, "$25.00");
        assert_eq!(cart.items.len(), 2);
    }

    #[test]
    fn test_line_views_carry_unit_and_line_prices() {
        let lines = vec![line(1, Decimal::new(999, 2), 3)];
        let cart = CartView::from_lines(&lines);

        let item = cart.items.first().expect("one line");
        assert_eq!(item.price, "$9.99");
        assert_eq!(item.line_total, "$29.97");
        assert_eq!(item.quantity, 3);
    }

    #[test]
    fn test_empty_cart_view() {
        let cart = CartView::empty();
        assert_eq!(cart.total_items, 0);
        assert_eq!(cart.total_amount, "$0.00");
        assert!(cart.items.is_empty());

        assert_eq!(CartView::from_lines(&[]).total_amount, "$0.00");
    }
}
