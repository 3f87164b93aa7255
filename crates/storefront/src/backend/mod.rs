//! REST client for the store backend.
//!
//! The backend owns every persisted entity. Catalog reads (product lists,
//! single products, categories) and the holiday status are cached with
//! `moka` for 30 seconds; everything else goes straight through.
//!
//! # Example
//!
//! ```rust,ignore
//! use nikola_storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config.backend);
//! let product = client.product(&ProductId::new("665f1c")).await?;
//! let related = client.products_in_category(&product.category[0]).await?;
//! ```

mod cache;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use nikola_core::account::{AuthResponse, Credentials, Profile, Registration};
use nikola_core::catalog::{Category, Product};
use nikola_core::checkout::OrderRequest;
use nikola_core::contact::ContactTicket;
use nikola_core::order::Order;
use nikola_core::promo::holiday::REFRESH_INTERVAL_SECS;
use nikola_core::promo::{ContestEntry, ContestSpots, HolidayStatus, SpinResult};
use nikola_core::review::{NewReview, ReviewEdit, ReviewPage, ReviewQuery};
use nikola_core::{ProductId, ReviewId};

use crate::config::BackendConfig;

use cache::{CacheKey, CacheValue};

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

// =============================================================================
// BackendClient
// =============================================================================

/// Client for the store backend.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<CacheKey, CacheValue>,
    last_holiday: Cache<(), HolidayStatus>,
}

impl BackendClient {
    /// Create a new backend client.
    #[must_use]
    pub fn new(config: &BackendConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(REFRESH_INTERVAL_SECS))
            .build();

        Self {
            inner: Arc::new(BackendClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.clone(),
                cache,
                last_holiday: Cache::new(1),
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

    /// Send a request and parse the JSON body.
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

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, BackendError> {
        self.send(self.inner.client.get(self.url(path)), token).await
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        self.send_raw(self.inner.client.post(self.url(path)).json(body), token)
            .await
            .map(drop)
    }

    async fn cached_products(
        &self,
        key: CacheKey,
        path: &str,
    ) -> Result<Vec<Product>, BackendError> {
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }
        let products: Vec<Product> = self.get(path, None).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Every product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        self.cached_products(CacheKey::Products, "/api/products")
            .await
    }

    /// Products in one category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn products_in_category(&self, category: &str) -> Result<Vec<Product>, BackendError> {
        let path = format!("/api/products?category={}", urlencoding::encode(category));
        self.cached_products(CacheKey::Category(category.to_lowercase()), &path)
            .await
    }

    /// Free-text product search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, BackendError> {
        let query = query.trim();
        if query.is_empty() {
            return self.products().await;
        }
        let path = format!("/api/products/search/{}", urlencoding::encode(query));
        self.cached_products(CacheKey::Search(query.to_lowercase()), &path)
            .await
    }

    /// One product by backend ID.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` for an unknown product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, BackendError> {
        let key = CacheKey::Product(id.as_str().to_string());
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }
        let path = format!("/api/products/{}", urlencoding::encode(id.as_str()));
        let product: Product = self.get(&path, None).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Every category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, BackendError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            return Ok(categories);
        }
        let categories: Vec<Category> = self.get("/api/products/categories", None).await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    // =========================================================================
    // Reviews
    // =========================================================================

    /// One page of reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn reviews(
        &self,
        product: &ProductId,
        query: &ReviewQuery,
    ) -> Result<ReviewPage, BackendError> {
        let request = self
            .inner
            .client
            .get(self.url(&reviews_path(product)))
            .query(&query.to_pairs());
        self.send(request, None).await
    }

    /// Post a validated review.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the review.
    #[instrument(skip(self, review, token))]
    pub async fn add_review(
        &self,
        product: &ProductId,
        review: &NewReview,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        self.post(&reviews_path(product), review, token).await
    }

    /// Replace the rating and comment of a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the edit.
    #[instrument(skip(self, edit, token))]
    pub async fn edit_review(
        &self,
        product: &ProductId,
        review: &ReviewId,
        edit: &ReviewEdit,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        let path = format!("{}/{}", reviews_path(product), urlencoding::encode(review.as_str()));
        self.send_raw(self.inner.client.put(self.url(&path)).json(edit), token)
            .await
            .map(drop)
    }

    /// Delete a review. Authors prove ownership with their email.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, token))]
    pub async fn delete_review(
        &self,
        product: &ProductId,
        review: &ReviewId,
        email: Option<&str>,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        let path = format!("{}/{}", reviews_path(product), urlencoding::encode(review.as_str()));
        let mut request = self.inner.client.delete(self.url(&path));
        if let Some(email) = email {
            request = request.query(&[("email", email)]);
        }
        self.send_raw(request, token).await.map(drop)
    }

    /// Reply to a review (admin accounts).
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, comment, token))]
    pub async fn reply_to_review(
        &self,
        product: &ProductId,
        review: &ReviewId,
        comment: &str,
        token: &str,
    ) -> Result<(), BackendError> {
        let path = format!(
            "{}/{}/replies",
            reviews_path(product),
            urlencoding::encode(review.as_str())
        );
        self.post(&path, &serde_json::json!({ "comment": comment }), Some(token))
            .await
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

    /// Create an account.
    ///
    /// Returns the new account's token when the backend logs it in straight
    /// away.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message when registration fails.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<Option<AuthResponse>, BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/users/register"))
            .json(registration);
        let body = self.send_raw(request, None).await?;
        Ok(serde_json::from_str(&body).ok())
    }

    /// Profile of the token holder.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Unauthorized` for an expired token.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &str) -> Result<Profile, BackendError> {
        self.get("/api/users", Some(token)).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders placed by the token holder.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self, token))]
    pub async fn my_orders(&self, token: &str) -> Result<Vec<Order>, BackendError> {
        self.get("/api/orders", Some(token)).await
    }

    /// Place an order. Guests order without a token.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message when the order is refused.
    #[instrument(skip(self, order, token), fields(lines = order.items.len()))]
    pub async fn place_order(
        &self,
        order: &OrderRequest<'_>,
        token: Option<&str>,
    ) -> Result<(), BackendError> {
        self.post("/api/orders", order, token).await
    }

    // =========================================================================
    // Contact & newsletter
    // =========================================================================

    /// Open a support ticket.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self, ticket), fields(subject = %ticket.subject))]
    pub async fn submit_ticket(&self, ticket: &ContactTicket) -> Result<(), BackendError> {
        self.post("/api/tickets", ticket, None).await
    }

    /// Ask the backend to email a newsletter OTP.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    #[instrument(skip(self))]
    pub async fn newsletter_send_otp(&self, email: &str) -> Result<(), BackendError> {
        self.post(
            "/api/newsletter/send-otp",
            &serde_json::json!({ "email": email }),
            None,
        )
        .await
    }

    /// Confirm a newsletter subscription.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message for a wrong OTP.
    #[instrument(skip(self, otp))]
    pub async fn newsletter_verify_otp(&self, email: &str, otp: &str) -> Result<(), BackendError> {
        self.post(
            "/api/newsletter/verify-otp",
            &serde_json::json!({ "email": email, "otp": otp }),
            None,
        )
        .await
    }

    // =========================================================================
    // Seasonal
    // =========================================================================

    /// Fetch the holiday status, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached.
    #[instrument(skip(self))]
    pub async fn fetch_holiday_status(&self) -> Result<HolidayStatus, BackendError> {
        self.get("/api/holiday/status", None).await
    }

    /// Current holiday status.
    ///
    /// Never fails: an unreachable backend yields the last status seen, or
    /// [`HolidayStatus::FALLBACK`] when there is none.
    pub async fn holiday_status(&self) -> HolidayStatus {
        if let Some(CacheValue::Holiday(status)) = self.inner.cache.get(&CacheKey::Holiday).await {
            return status;
        }

        let fetched = self.fetch_holiday_status().await;
        match &fetched {
            Ok(status) => {
                self.inner
                    .cache
                    .insert(CacheKey::Holiday, CacheValue::Holiday(*status))
                    .await;
                self.inner.last_holiday.insert((), *status).await;
            }
            Err(e) => tracing::warn!(error = %e, "Holiday status unavailable, using fallback"),
        }
        HolidayStatus::resolve(fetched, self.inner.last_holiday.get(&()).await)
    }

    /// Spin the wheel for the token holder.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message (e.g. already spun).
    #[instrument(skip(self, token))]
    pub async fn spin_wheel(&self, token: &str) -> Result<SpinResult, BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/christmas-features/spin-wheel"))
            .json(&serde_json::json!({}));
        self.send(request, Some(token)).await
    }

    /// Remaining contest spots.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not parse.
    #[instrument(skip(self))]
    pub async fn contest_spots(&self) -> Result<ContestSpots, BackendError> {
        self.get("/api/christmas-features/contest/spots", None)
            .await
    }

    /// Enter the limited-spots contest.
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message (e.g. no spots left).
    #[instrument(skip(self, token))]
    pub async fn enter_contest(&self, token: &str) -> Result<ContestEntry, BackendError> {
        let request = self
            .inner
            .client
            .post(self.url("/api/christmas-features/contest/enter"))
            .json(&serde_json::json!({ "method": "spin" }));
        self.send(request, Some(token)).await
    }
}

fn reviews_path(product: &ProductId) -> String {
    format!("/api/products/{}/reviews", urlencoding::encode(product.as_str()))
}
