//! REST client for the store backend, admin side.
//!
//! Every call except login carries the admin's bearer token. Nothing is
//! cached: the panel always shows what the backend holds right now.
//!
//! # Example
//!
//! ```rust,ignore
//! use nikola_admin::backend::AdminBackend;
//!
//! let backend = AdminBackend::new(&config.backend);
//! let page = backend.orders_page(1, 10, &admin.token).await?;
//! ```

mod upload;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::instrument;

use nikola_core::account::{AuthResponse, Credentials, Profile};
use nikola_core::admin::{Broadcast, NewCategory, NewPromo, ProductPayload, Promo};
use nikola_core::catalog::{Category, Product};
use nikola_core::contact::Ticket;
use nikola_core::order::{Order, OrderPage, OrderUpdate};
use nikola_core::promo::{HolidayStatus, HolidayUpdate};
use nikola_core::{CategoryId, OrderId, ProductId};

use crate::config::BackendConfig;

pub use upload::ImageUpload;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Missing or rejected bearer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl BackendError {
    /// The backend's own explanation when it sent one, otherwise `fallback`.
    #[must_use]
    pub fn user_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        match self {
            Self::Status { message, .. } | Self::Unauthorized(message) | Self::NotFound(message)
                if !message.is_empty() =>
            {
                message.as_str()
            }
            _ => fallback,
        }
    }
}

/// Pull `message` (or `error`) out of a JSON error body.
fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .map(ToOwned::to_owned)
}

fn truncated(body: &str) -> String {
    body.chars().take(500).collect()
}

fn encode(segment: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(segment)
}

// =============================================================================
// AdminBackend
// =============================================================================

/// Admin client for the store backend.
#[derive(Clone)]
pub struct AdminBackend {
    inner: Arc<AdminBackendInner>,
}

struct AdminBackendInner {
    client: reqwest::Client,
    base_url: String,
}

impl AdminBackend {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            inner: Arc::new(AdminBackendInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
            }),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Send a request and return the raw body of a successful response.
    async fn send_raw(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> Result<String, BackendError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %truncated(&body),
                "Backend returned non-success status"
            );
            let message = backend_message(&body).unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => BackendError::Unauthorized(message),
                404 => BackendError::NotFound(message),
                code => BackendError::Status {
                    status: code,
                    message,
                },
            });
        }

        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        let body = self.send_raw(request, token).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %truncated(&body),
                "Failed to parse backend response"
            );
            BackendError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<T, BackendError> {
        self.send(self.inner.client.get(self.url(path)), Some(token))
            .await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<(), BackendError> {
        self.send_raw(
            self.inner.client.post(self.url(path)).json(body),
            Some(token),
        )
        .await
        .map(drop)
    }

    async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<(), BackendError> {
        self.send_raw(self.inner.client.put(self.url(path)).json(body), Some(token))
            .await
            .map(drop)
    }

    async fn delete(&self, path: &str, token: &str) -> Result<(), BackendError> {
        self.send_raw(self.inner.client.delete(self.url(path)), Some(token))
            .await
            .map(drop)
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` (or a status error carrying the
    /// backend message) for rejected credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/users/login"))
            .json(credentials);
        self.send(request, None).await
    }

    /// Profile of the token holder, used to confirm the admin role.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` for an expired token.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.get("/api/users/profile", token).await
    }

    /// Every registered account.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn users(&self, token: &str) -> Result<Vec<Profile>, BackendError> {
        self.get("/api/users/all", token).await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn products(&self, token: &str) -> Result<Vec<Product>, BackendError> {
        self.get("/api/products", token).await
    }

    /// One product by backend ID.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` for an unknown product.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId, token: &str) -> Result<Product, BackendError> {
        self.get(&format!("/api/products/{}", encode(id.as_str())), token)
            .await
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message when the product is refused.
    #[instrument(skip(self, payload, token), fields(name = %payload.name))]
    pub async fn create_product(
        &self,
        payload: &ProductPayload,
        token: &str,
    ) -> Result<(), BackendError> {
        self.post("/api/products", payload, token).await
    }

    /// Replace a product.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message when the update is refused.
    #[instrument(skip(self, payload, token), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: &ProductId,
        payload: &ProductPayload,
        token: &str,
    ) -> Result<(), BackendError> {
        self.put(&format!("/api/products/{}", encode(id.as_str())), payload, token)
            .await
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, id: &ProductId, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/products/{}", encode(id.as_str())), token)
            .await
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn categories(&self, token: &str) -> Result<Vec<Category>, BackendError> {
        self.get("/api/products/categories", token).await
    }

    /// Create a category. The backend derives the slug.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message (e.g. duplicate name).
    #[instrument(skip(self, category, token), fields(name = %category.name))]
    pub async fn create_category(
        &self,
        category: &NewCategory,
        token: &str,
    ) -> Result<(), BackendError> {
        self.post("/api/products/categories", category, token).await
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, token), fields(category_id = %id))]
    pub async fn delete_category(&self, id: &CategoryId, token: &str) -> Result<(), BackendError> {
        self.delete(
            &format!("/api/products/categories/{}", encode(id.as_str())),
            token,
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// One page of orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn orders_page(
        &self,
        page: u32,
        limit: u32,
        token: &str,
    ) -> Result<OrderPage, BackendError> {
        self.get(&format!("/api/orders/{page}/{limit}"), token).await
    }

    /// Set an order's status and notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, update, token), fields(order_id = %id, status = %update.status))]
    pub async fn update_order(
        &self,
        id: &OrderId,
        update: &OrderUpdate,
        token: &str,
    ) -> Result<(), BackendError> {
        self.put(&format!("/api/orders/{}", encode(id.as_str())), update, token)
            .await
    }

    /// Delete an order permanently.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn delete_order(&self, id: &OrderId, token: &str) -> Result<(), BackendError> {
        self.delete(&format!("/api/orders/{}", encode(id.as_str())), token)
            .await
    }

    /// Find an order on a given page.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` when the page does not hold the order.
    pub async fn order_on_page(
        &self,
        id: &OrderId,
        page: u32,
        limit: u32,
        token: &str,
    ) -> Result<Order, BackendError> {
        self.orders_page(page, limit, token)
            .await?
            .orders
            .into_iter()
            .find(|order| &order.order_id == id)
            .ok_or_else(|| BackendError::NotFound(format!("Order {id} not found")))
    }

    // =========================================================================
    // Support & newsletter
    // =========================================================================

    /// Every support ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn tickets(&self, token: &str) -> Result<Vec<Ticket>, BackendError> {
        self.get("/api/tickets", token).await
    }

    /// Every promo code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn promos(&self, token: &str) -> Result<Vec<Promo>, BackendError> {
        self.get("/api/newsletter/promos", token).await
    }

    /// Create a promo code.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message (e.g. duplicate code).
    #[instrument(skip(self, promo, token), fields(code = %promo.code))]
    pub async fn create_promo(&self, promo: &NewPromo, token: &str) -> Result<(), BackendError> {
        self.post("/api/newsletter/promos", promo, token).await
    }

    /// Email every newsletter subscriber.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, broadcast, token), fields(subject = %broadcast.subject))]
    pub async fn broadcast(&self, broadcast: &Broadcast, token: &str) -> Result<(), BackendError> {
        self.post("/api/newsletter/broadcast", broadcast, token)
            .await
    }

    // =========================================================================
    // Holiday mode
    // =========================================================================

    /// Current holiday status.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn holiday_status(&self) -> Result<HolidayStatus, BackendError> {
        self.send(
            self.inner.client.get(self.url("/api/holiday/status")),
            None,
        )
        .await
    }

    /// Switch holiday mode and set its discount.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, token))]
    pub async fn update_holiday(
        &self,
        update: &HolidayUpdate,
        token: &str,
    ) -> Result<(), BackendError> {
        self.post("/api/holiday/toggle", update, token).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message() {
        assert_eq!(
            backend_message(r#"{"message": "Category exists"}"#).as_deref(),
            Some("Category exists")
        );
        assert_eq!(
            backend_message(r#"{"error": "Forbidden"}"#).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(backend_message("Bad Gateway"), None);
    }

    #[test]
    fn test_user_message_falls_back_when_blank() {
        let err = BackendError::Status {
            status: 409,
            message: String::new(),
        };
        assert_eq!(err.user_message("Failed to add category"), "Failed to add category");

        let err = BackendError::NotFound("Order gone".to_string());
        assert_eq!(err.user_message("Failed"), "Order gone");
    }

    #[test]
    fn test_truncated_limits_length() {
        let long = "x".repeat(2000);
        assert_eq!(truncated(&long).len(), 500);
    }
}
