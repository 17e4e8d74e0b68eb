//! Catalog route handlers.
//!
//! The listing is stateless with respect to the server: every filter change
//! is a fresh `GET /products` whose parameters are forwarded to the API as
//! query parameters. "Clear filters" is just the unfiltered listing, which
//! the commerce client serves from its cache of the last full fetch.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use larkspur_core::ProductId;

use crate::commerce::{CatalogFilter, Product};
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::routes::{Flash, UserView, empty_to_none, flash_from};
use crate::state::AppState;

/// Catalog listing query parameters: the filter fields plus flash messages.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    #[serde(default, deserialize_with = "empty_to_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub min_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub max_price: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub success: Option<String>,
    #[serde(default, deserialize_with = "empty_to_none")]
    pub info: Option<String>,
}

impl CatalogQuery {
    fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            category: self.category.clone(),
            name: self.name.clone(),
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    fn flash(&self) -> Option<Flash> {
        flash_from(self.error.clone(), self.success.clone(), self.info.clone())
    }
}

/// The action control rendered on a product card.
///
/// Exactly one of three states, derived purely from `{authenticated?, stock}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductAction {
    /// Disabled control; authentication state is irrelevant at zero stock.
    OutOfStock,
    /// Submitting records a pending add and redirects to login - never adds.
    LoginToAdd,
    /// Submitting adds directly.
    AddToCart,
}

impl ProductAction {
    /// Derive the action state for a product card.
    #[must_use]
    pub const fn for_product(authenticated: bool, stock: u32) -> Self {
        if stock == 0 {
            Self::OutOfStock
        } else if authenticated {
            Self::AddToCart
        } else {
            Self::LoginToAdd
        }
    }
}

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub description: String,
    pub price: String,
    pub stock_label: String,
    pub stock_class: &'static str,
    pub image_url: Option<String>,
    pub action: ProductAction,
}

impl ProductCardView {
    fn from_product(product: &Product, authenticated: bool) -> Self {
        let stock_label = if product.stock == 0 {
            "Out of Stock".to_string()
        } else {
            format!("{} in stock", product.stock)
        };
        let stock_class = match product.stock {
            0 => "out",
            1..=9 => "low",
            _ => "",
        };

        Self {
            id: product.id,
            name: product.name.clone(),
            category: product.category.clone(),
            description: product.description.clone(),
            price: product.unit_price().display(),
            stock_label,
            stock_class,
            image_url: product.image_url.clone(),
            action: ProductAction::for_product(authenticated, product.stock),
        }
    }
}

/// Echo of the submitted filter values, for repopulating the form.
#[derive(Debug, Clone, Default)]
pub struct FilterFormView {
    pub category: String,
    pub name: String,
    pub min_price: String,
    pub max_price: String,
}

impl From<&CatalogQuery> for FilterFormView {
    fn from(query: &CatalogQuery) -> Self {
        Self {
            category: query.category.clone().unwrap_or_default(),
            name: query.name.clone().unwrap_or_default(),
            min_price: query.min_price.map(|d| d.to_string()).unwrap_or_default(),
            max_price: query.max_price.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

/// Catalog listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "catalog/index.html")]
pub struct CatalogTemplate {
    pub user: Option<UserView>,
    pub flash: Option<Flash>,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<String>,
    pub filter: FilterFormView,
    pub count: usize,
}

/// Display the catalog listing.
///
/// Both fetches degrade independently: a failed item fetch renders an empty
/// grid with an error banner, a failed category fetch just leaves the
/// dropdown with "All Categories".
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> CatalogTemplate {
    let filter = query.filter();
    let mut flash = query.flash();

    let products = match state.commerce().items(&filter).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            let fallback = if filter.is_empty() {
                "Failed to load products"
            } else {
                "Failed to apply filters"
            };
            flash.get_or_insert(Flash {
                kind: "error",
                text: fallback.to_string(),
            });
            Vec::new()
        }
    };

    let categories = match state.commerce().categories().await {
        Ok(categories) => categories,
        Err(e) => {
            tracing::warn!("Failed to load categories: {e}");
            Vec::new()
        }
    };

    let authenticated = user.is_some();
    let cards: Vec<ProductCardView> = products
        .iter()
        .map(|p| ProductCardView::from_product(p, authenticated))
        .collect();
    let count = cards.len();

    CatalogTemplate {
        user: user.as_ref().map(UserView::from),
        flash,
        products: cards,
        categories,
        filter: FilterFormView::from(&query),
        count,
    }
}
