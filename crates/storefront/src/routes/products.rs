//! Product listing and product detail handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nikola_core::catalog::{ALL_CATEGORIES, Category, Product, filter_by_category, related_products};
use nikola_core::review::{ReviewPage, ReviewQuery, ReviewSort};
use nikola_core::wishlist::Wishlist;
use nikola_core::ProductId;

use crate::error::Result;
use crate::filters;
use crate::middleware::PageContext;
use crate::models::{load, session_keys};
use crate::state::AppState;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub query: String,
    pub category: String,
    pub wishlist: Wishlist,
}

impl ProductsIndexTemplate {
    fn is_saved(&self, product: &Product) -> bool {
        self.wishlist.contains(&product.id)
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub price: nikola_core::Price,
    pub reviews: ReviewPage,
    pub review_query: ReviewQuery,
    pub sorts: [ReviewSort; 4],
    pub ratings: [u8; 5],
    pub related: Vec<Product>,
    pub in_wishlist: bool,
}

impl ProductShowTemplate {
    /// Link to another page of reviews, keeping sort and filter.
    #[must_use]
    pub fn reviews_link(&self, page: u32) -> String {
        let mut link = format!(
            "/overview/{}?page={page}&sort={}",
            urlencoding::encode(self.product.id.as_str()),
            self.review_query.sort.as_str()
        );
        if let Some(rating) = self.review_query.rating {
            link.push_str(&format!("&rating={rating}"));
        }
        link.push_str("#reviews");
        link
    }

    fn previous_link(&self) -> String {
        self.reviews_link(self.reviews.page.saturating_sub(1).max(1))
    }

    fn next_link(&self) -> String {
        self.reviews_link(self.reviews.page + 1)
    }

    fn rating_percent(&self, rating: &u8) -> u32 {
        self.reviews.breakdown.percent(*rating)
    }

    fn rating_count(&self, rating: &u8) -> u32 {
        self.reviews.breakdown.count(*rating)
    }

    /// Whether the logged-in customer wrote this review.
    #[must_use]
    pub fn is_own_review(&self, email: &str) -> bool {
        !email.is_empty() && self.ctx.customer_email().eq_ignore_ascii_case(email)
    }
}

/// Display the product listing.
///
/// `q` searches the backend; `category` filters the full catalog.
#[instrument(skip(state, session, ctx))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Query(query): Query<ListingQuery>,
) -> Result<impl IntoResponse> {
    let search = query.q.unwrap_or_default().trim().to_string();
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());

    let products = if search.is_empty() {
        state.backend().products().await?
    } else {
        state.backend().search_products(&search).await?
    };
    let products = filter_by_category(products, &category);

    let categories = state.backend().categories().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load categories");
        Vec::new()
    });
    let wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;

    Ok(ProductsIndexTemplate {
        ctx,
        products,
        categories,
        query: search,
        category,
        wishlist,
    })
}

/// Display one product with its reviews and related products.
#[instrument(skip(state, session, ctx), fields(product_id = %id))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    ctx: PageContext,
    Path(id): Path<String>,
    Query(review_query): Query<ReviewQuery>,
) -> Result<impl IntoResponse> {
    let id = ProductId::new(id);
    let product = state.backend().product(&id).await?;
    let review_query = review_query.normalized();

    let reviews = state
        .backend()
        .reviews(&id, &review_query)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load reviews");
            ReviewPage::default()
        });

    let related = match product.category.first() {
        Some(category) => match state.backend().products_in_category(category).await {
            Ok(candidates) => related_products(candidates, &product),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load related products");
                Vec::new()
            }
        },
        None => Vec::new(),
    };

    let wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;
    let price = product.holiday_price(ctx.discount());

    Ok(ProductShowTemplate {
        in_wishlist: wishlist.contains(&product.id),
        ctx,
        price,
        product,
        reviews,
        review_query,
        sorts: [
            ReviewSort::Newest,
            ReviewSort::Oldest,
            ReviewSort::Highest,
            ReviewSort::Lowest,
        ],
        ratings: [5, 4, 3, 2, 1],
        related,
    })
}
