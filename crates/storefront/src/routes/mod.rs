//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                   - Home page
//! GET  /products?q=&category=              - Listing, search, category filter
//! GET  /overview/{id}                      - Product detail with reviews
//! POST /overview/{id}/reviews              - Add review (verified buyers)
//! POST /overview/{id}/reviews/{rid}/edit   - Edit own review
//! POST /overview/{id}/reviews/{rid}/delete - Delete own review
//! POST /overview/{id}/reviews/{rid}/reply  - Reply (admin accounts)
//!
//! # Cart & wishlist
//! GET  /cart                               - Cart page
//! POST /cart/add | /cart/update | /cart/remove
//! GET  /cart/count                         - Cart badge fragment
//! GET  /wishlist
//! POST /wishlist/toggle | /wishlist/remove
//!
//! # Checkout
//! GET  /checkout, POST /checkout           - Shipping details
//! GET  /payment, POST /payment             - Card form, places the order
//!
//! # Auth (POST rate limited)
//! GET  /login, POST /login
//! GET  /register, POST /register
//! POST /logout
//!
//! # Pages
//! GET  /reviews, POST /reviews             - Site testimonials
//! GET  /about-us
//! GET  /contact-us, POST /contact-us       - Support ticket
//! POST /newsletter/otp, POST /newsletter/verify
//!
//! # Christmas
//! GET  /christmas-offers                   - Wheel, contest, calendar
//! POST /christmas/spin
//! POST /christmas/contest
//! POST /christmas/calendar/{day}
//! GET  /christmas/gift-finder
//! GET  /api/holiday                        - Holiday status (JSON)
//!
//! # Fallback
//! *    any other path                      - dist files, then `index.html`
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod christmas;
pub mod contact;
pub mod fallback;
pub mod home;
pub mod products;
pub mod reviews;
pub mod wishlist;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::Result;
use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::models::{Toast, push_toast};
use crate::state::AppState;

/// Product and review routes.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/overview/{id}", get(products::show))
        .route("/overview/{id}/reviews", post(reviews::add))
        .route("/overview/{id}/reviews/{review_id}/edit", post(reviews::edit))
        .route(
            "/overview/{id}/reviews/{review_id}/delete",
            post(reviews::delete),
        )
        .route(
            "/overview/{id}/reviews/{review_id}/reply",
            post(reviews::reply),
        )
}

/// Cart and wishlist routes.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/toggle", post(wishlist::toggle))
        .route("/wishlist/remove", post(wishlist::remove))
}

/// Checkout and payment routes.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/payment", get(checkout::payment_page).post(checkout::pay))
}

/// Login and registration routes; form posts are rate limited.
pub fn auth_routes() -> Router<AppState> {
    let limited = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .layer(auth_rate_limiter());

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(limited)
}

/// Static content, testimonials, contact and newsletter routes.
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/reviews", get(home::testimonials).post(home::add_testimonial))
        .route("/about-us", get(home::about))
        .route("/contact-us", get(contact::show).post(contact::submit))
        .route("/newsletter/otp", post(contact::newsletter_otp))
        .route("/newsletter/verify", post(contact::newsletter_verify))
}

/// Seasonal promotion routes.
pub fn christmas_routes() -> Router<AppState> {
    let promo_actions = Router::new()
        .route("/christmas/spin", post(christmas::spin))
        .route("/christmas/contest", post(christmas::enter_contest))
        .route("/christmas/calendar/{day}", post(christmas::open_door))
        .route("/api/holiday", get(christmas::holiday_status))
        .layer(api_rate_limiter());

    Router::new()
        .route("/christmas-offers", get(christmas::offers))
        .route("/christmas/gift-finder", get(christmas::gift_finder))
        .merge(promo_actions)
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(page_routes())
        .merge(product_routes())
        .merge(cart_routes())
        .merge(checkout_routes())
        .merge(auth_routes())
        .merge(christmas_routes())
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Queue a toast and redirect (post/redirect/get).
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn redirect_with_toast(session: &Session, to: &str, toast: Toast) -> Result<Redirect> {
    push_toast(session, toast).await?;
    Ok(Redirect::to(to))
}

/// A same-site path to return to after a form post, or `fallback`.
///
/// Only absolute paths on this host are accepted.
#[must_use]
pub fn local_path(next: Option<&str>, fallback: &str) -> String {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path.to_string()
        }
        _ => fallback.to_string(),
    }
}
