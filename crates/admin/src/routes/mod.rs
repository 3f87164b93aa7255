//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Auth (backend accounts with the admin role)
//! GET  /login                      - Login page
//! POST /login                      - Log in
//! POST /logout                     - Logout
//!
//! # Dashboard
//! GET  /                           - Product, order and user counts
//!
//! # Products
//! GET  /products                   - Product listing
//! GET  /products/new               - New product form (restores the draft)
//! POST /products/new               - Create (multipart, images uploaded in parallel)
//! POST /products/new/draft         - Save the form as a draft
//! POST /products/new/draft/clear   - Discard the draft
//! GET  /products/{id}/edit         - Edit form
//! POST /products/{id}/edit         - Update (multipart)
//! POST /products/{id}/delete       - Delete
//!
//! # Orders
//! GET  /orders?page=&limit=        - Paginated listing
//! GET  /orders/{id}?page=&limit=   - Order detail
//! POST /orders/{id}                - Update status and notes
//! POST /orders/{id}/delete         - Delete
//!
//! # Categories, users, support
//! GET  /categories                 - Listing and add form
//! POST /categories                 - Add
//! POST /categories/{id}/delete     - Delete
//! GET  /users                      - Registered accounts
//! GET  /contacts                   - Support tickets
//!
//! # Settings
//! GET  /settings                   - Theme, promos, broadcast, holiday mode
//! POST /settings/theme             - Save panel colours
//! POST /settings/promos            - Create a promo code
//! POST /settings/broadcast         - Email newsletter subscribers
//! POST /settings/holiday           - Switch holiday mode
//! GET  /theme.css                  - Panel colours as CSS variables
//! ```
//!
//! Form handlers redirect back with `?success=` or `?error=` and the page
//! shows the message.

pub mod auth;
pub mod categories;
pub mod contacts;
pub mod dashboard;
pub mod multipart;
pub mod orders;
pub mod products;
pub mod settings;
pub mod users;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
};
use serde::Deserialize;

use crate::state::AppState;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(categories::router())
        .merge(users::router())
        .merge(contacts::router())
        .merge(settings::router())
}

/// `?success=` / `?error=` carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct NoticeQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl NoticeQuery {
    /// Success message, with short codes expanded.
    #[must_use]
    pub fn success_message(&self) -> Option<String> {
        self.success.as_deref().map(|s| {
            match s {
                "logged_out" => "You have been logged out.",
                "draft_saved" => "Draft saved.",
                "draft_cleared" => "Draft cleared.",
                other => other,
            }
            .to_owned()
        })
    }

    /// Error message, with short codes expanded.
    #[must_use]
    pub fn error_message(&self) -> Option<String> {
        self.error.as_deref().map(|e| {
            match e {
                "not_admin" => "You are not authorized.",
                other => other,
            }
            .to_owned()
        })
    }
}

fn with_notice(path: &str, key: &str, message: &str) -> String {
    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{path}{separator}{key}={}", urlencoding::encode(message))
}

/// Redirect to `path` with a success message.
#[must_use]
pub fn redirect_success(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_notice(path, "success", message))
}

/// Redirect to `path` with an error message.
#[must_use]
pub fn redirect_error(path: &str, message: &str) -> Redirect {
    Redirect::to(&with_notice(path, "error", message))
}

/// Render a template, logging instead of failing the request.
pub fn render<T: Template>(template: &T) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Template render failed");
        "Internal Server Error".to_string()
    }))
}
