//! End-to-end test harness for Nikola.
//!
//! [`MockBackend`] is an in-process stand-in for the REST backend, seeded
//! with a small catalog and recording every write it receives. The
//! storefront and admin apps are served on ephemeral ports against it and
//! driven with a cookie-keeping `reqwest` client.
//!
//! ```rust,ignore
//! let backend = MockBackend::new();
//! let backend_url = backend.spawn().await;
//! let admin = spawn_admin(&backend_url).await;
//! let client = client();
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

/// Seeded admin account.
pub const ADMIN_EMAIL: &str = "admin@nikola.lk";
/// Seeded customer account.
pub const CUSTOMER_EMAIL: &str = "shopper@nikola.lk";
/// Password of both seeded accounts.
pub const PASSWORD: &str = "secret123";
/// The only newsletter code the mock accepts.
pub const NEWSLETTER_OTP: &str = "424242";

const ADMIN_TOKEN: &str = "admin-token";
const CUSTOMER_TOKEN: &str = "customer-token";

/// A write the mock backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub body: Value,
}

/// Everything the mock backend stores.
#[derive(Debug)]
pub struct BackendData {
    pub products: Vec<Value>,
    pub categories: Vec<Value>,
    pub orders: Vec<Value>,
    pub tickets: Vec<Value>,
    pub promos: Vec<Value>,
    pub holiday: Value,
    pub contest_spots: u32,
    pub requests: Vec<RecordedRequest>,
    next_id: u32,
}

impl Default for BackendData {
    fn default() -> Self {
        Self {
            products: vec![
                json!({
                    "_id": "p1",
                    "productId": "NK001",
                    "name": "Santa Mug",
                    "description": "Stoneware mug with a festive glaze",
                    "images": ["https://cdn.test/mug.png"],
                    "price": 1500,
                    "labelledPrice": 2000,
                    "stock": 10,
                    "isAvailable": true,
                    "category": ["kitchen"],
                    "colors": ["red", "white"],
                    "sizes": []
                }),
                json!({
                    "_id": "p2",
                    "productId": "NK002",
                    "name": "Elf Hat",
                    "images": [],
                    "price": 900,
                    "labelledPrice": 900,
                    "stock": 0,
                    "isAvailable": true,
                    "category": ["apparel"]
                }),
            ],
            categories: vec![json!({
                "_id": "c1",
                "name": "Kitchen",
                "slug": "kitchen",
                "description": "Mugs and more"
            })],
            orders: (1..=3)
                .map(|n| {
                    json!({
                        "orderID": format!("ORD000{n}"),
                        "email": CUSTOMER_EMAIL,
                        "name": "Amaya Silva",
                        "address": "12 Galle Road",
                        "phone": "0771234567",
                        "city": "Colombo",
                        "status": "pending",
                        "notes": null,
                        "items": [{
                            "productId": "p1",
                            "name": "Santa Mug",
                            "price": 1500,
                            "qty": n,
                            "image": "https://cdn.test/mug.png"
                        }],
                        "total": 1500 * n,
                        "date": "2025-12-01T10:00:00Z"
                    })
                })
                .collect(),
            tickets: vec![json!({
                "_id": "t1",
                "name": "Amaya Silva",
                "email": CUSTOMER_EMAIL,
                "subject": "Delivery time",
                "message": "When will my mug arrive?",
                "createdAt": "2025-12-02T08:30:00Z"
            })],
            promos: vec![json!({
                "_id": "promo1",
                "code": "XMAS10",
                "description": "Ten percent off",
                "discountPercent": 10
            })],
            holiday: json!({ "enabled": false, "discount": 0 }),
            contest_spots: 42,
            requests: Vec::new(),
            next_id: 100,
        }
    }
}

impl BackendData {
    fn record(&mut self, method: &'static str, path: impl Into<String>, body: Value) {
        self.requests.push(RecordedRequest {
            method,
            path: path.into(),
            body,
        });
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }
}

/// In-process mock of the REST backend.
#[derive(Clone, Default)]
pub struct MockBackend {
    data: Arc<Mutex<BackendData>>,
}

impl MockBackend {
    /// A backend with the default seed data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the stored data.
    pub fn data(&self) -> MutexGuard<'_, BackendData> {
        self.data.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Recorded writes matching `method` and `path`.
    #[must_use]
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.data()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .cloned()
            .collect()
    }

    /// The backend routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/products", get(list_products).post(create_product))
            .route("/api/products/search/{query}", get(search_products))
            .route(
                "/api/products/categories",
                get(list_categories).post(create_category),
            )
            .route(
                "/api/products/categories/{id}",
                axum::routing::delete(delete_category),
            )
            .route("/api/products/upload-image", post(upload_image))
            .route(
                "/api/products/{id}",
                get(product).put(update_product).delete(delete_product),
            )
            .route("/api/products/{id}/reviews", post(add_review))
            .route("/api/users/login", post(login))
            .route("/api/users", get(profile))
            .route("/api/users/profile", get(profile))
            .route("/api/users/all", get(all_users))
            .route("/api/orders", get(customer_orders).post(create_order))
            .route("/api/orders/{page}/{limit}", get(orders_page))
            .route("/api/orders/{id}", put(update_order).delete(delete_order))
            .route("/api/tickets", get(list_tickets).post(create_ticket))
            .route("/api/newsletter/promos", get(list_promos).post(create_promo))
            .route("/api/newsletter/broadcast", post(broadcast))
            .route("/api/newsletter/send-otp", post(send_otp))
            .route("/api/newsletter/verify-otp", post(verify_otp))
            .route("/api/holiday/status", get(holiday_status))
            .route("/api/holiday/toggle", post(toggle_holiday))
            .route("/api/christmas-features/spin-wheel", post(spin_wheel))
            .route("/api/christmas-features/contest/spots", get(contest_spots))
            .route("/api/christmas-features/contest/enter", post(enter_contest))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral port and return the base URL.
    pub async fn spawn(&self) -> String {
        serve(self.router()).await
    }
}

// =============================================================================
// Serving helpers
// =============================================================================

/// Serve `app` on an ephemeral loopback port and return its base URL.
///
/// # Panics
///
/// Panics if no port can be bound.
pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });
    format!("http://{addr}")
}

/// Serve the storefront against `backend_url`, with `dist` as the SPA build.
///
/// # Panics
///
/// Panics if `backend_url` does not parse.
pub async fn spawn_storefront(backend_url: &str, dist: PathBuf) -> String {
    use nikola_storefront::config::StorefrontConfig;
    use nikola_storefront::middleware::{StorefrontSessionStore, create_session_layer};
    use nikola_storefront::state::AppState;

    let config = StorefrontConfig::local(backend_url, dist).expect("Invalid backend URL");
    let store = StorefrontSessionStore::connect(None).expect("Memory store");
    let session_layer = create_session_layer(store, &config);
    serve(nikola_storefront::app(AppState::new(config), session_layer)).await
}

/// Serve the admin panel against `backend_url`.
///
/// # Panics
///
/// Panics if `backend_url` does not parse.
pub async fn spawn_admin(backend_url: &str) -> String {
    use nikola_admin::config::AdminConfig;
    use nikola_admin::middleware::{AdminSessionStore, create_session_layer};
    use nikola_admin::state::AppState;

    let config = AdminConfig::local(backend_url).expect("Invalid backend URL");
    let store = AdminSessionStore::connect(None).expect("Memory store");
    let session_layer = create_session_layer(store, &config);
    serve(nikola_admin::app(AppState::new(config), session_layer)).await
}

/// A browser-like client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// Panics if the TLS backend fails to initialize.
#[must_use]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build HTTP client")
}

/// `Location` header of a redirect, or empty.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// =============================================================================
// Handlers
// =============================================================================

type Mock = State<MockBackend>;

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

fn is_admin(headers: &HeaderMap) -> bool {
    bearer(headers) == Some(ADMIN_TOKEN)
}

fn id_of(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

async fn list_products(
    State(mock): Mock,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Vec<Value>> {
    let products = mock.data().products.clone();
    let Some(category) = query.get("category") else {
        return Json(products);
    };
    Json(
        products
            .into_iter()
            .filter(|p| {
                p.get("category")
                    .and_then(Value::as_array)
                    .is_some_and(|cats| cats.iter().any(|c| c.as_str() == Some(category)))
            })
            .collect(),
    )
}

async fn search_products(State(mock): Mock, Path(query): Path<String>) -> Json<Vec<Value>> {
    let query = query.to_lowercase();
    Json(
        mock.data()
            .products
            .iter()
            .filter(|p| id_of(p, "name").to_lowercase().contains(&query))
            .cloned()
            .collect(),
    )
}

async fn product(State(mock): Mock, Path(id): Path<String>) -> Response {
    mock.data()
        .products
        .iter()
        .find(|p| id_of(p, "_id") == id)
        .cloned()
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p).into_response(),
        )
}

async fn create_product(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("POST", "/api/products", body.clone());
    let mut product = body;
    let id = data.next_id("p");
    if let Some(fields) = product.as_object_mut() {
        fields.insert("_id".to_string(), Value::String(id));
    }
    data.products.push(product);
    Json(json!({ "message": "Product created" })).into_response()
}

async fn update_product(
    State(mock): Mock,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    mock.data()
        .record("PUT", format!("/api/products/{id}"), body);
    Json(json!({ "message": "Product updated" })).into_response()
}

async fn delete_product(State(mock): Mock, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("DELETE", format!("/api/products/{id}"), Value::Null);
    data.products.retain(|p| id_of(p, "_id") != id);
    Json(json!({ "message": "Product deleted" })).into_response()
}

async fn upload_image(State(mock): Mock, headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut file_name = String::new();
    let mut size = 0;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("image") {
            file_name = field.file_name().unwrap_or_default().to_string();
            size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        }
    }
    if file_name.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No image");
    }
    mock.data().record(
        "POST",
        "/api/products/upload-image",
        json!({ "file": file_name, "size": size }),
    );
    Json(json!({ "url": format!("https://cdn.test/{file_name}") })).into_response()
}

async fn list_categories(State(mock): Mock) -> Json<Vec<Value>> {
    Json(mock.data().categories.clone())
}

async fn create_category(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let name = id_of(&body, "name");
    let mut data = mock.data();
    data.record("POST", "/api/products/categories", body.clone());
    if data.categories.iter().any(|c| id_of(c, "name") == name) {
        return error(StatusCode::CONFLICT, "Category already exists");
    }
    let id = data.next_id("c");
    data.categories.push(json!({
        "_id": id,
        "name": name,
        "slug": name.to_lowercase(),
        "description": id_of(&body, "description"),
    }));
    Json(json!({ "message": "Category created" })).into_response()
}

async fn delete_category(State(mock): Mock, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("DELETE", format!("/api/products/categories/{id}"), Value::Null);
    data.categories.retain(|c| id_of(c, "_id") != id);
    Json(json!({ "message": "Category deleted" })).into_response()
}

async fn add_review(
    State(mock): Mock,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token expired");
    }
    mock.data()
        .record("POST", format!("/api/products/{id}/reviews"), body);
    Json(json!({ "message": "Review added" })).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> Response {
    if body.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    match body.email.as_str() {
        ADMIN_EMAIL => Json(json!({ "token": ADMIN_TOKEN, "role": "admin" })).into_response(),
        CUSTOMER_EMAIL => Json(json!({ "token": CUSTOMER_TOKEN, "role": "user" })).into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

fn admin_profile() -> Value {
    json!({
        "_id": "u1",
        "firstName": "Nimal",
        "lastName": "Perera",
        "email": ADMIN_EMAIL,
        "role": "admin",
        "isBlocked": false
    })
}

fn customer_profile() -> Value {
    json!({
        "_id": "u2",
        "firstName": "Amaya",
        "lastName": "Silva",
        "email": CUSTOMER_EMAIL,
        "role": "user",
        "isBlocked": false
    })
}

async fn profile(headers: HeaderMap) -> Response {
    match bearer(&headers) {
        Some(ADMIN_TOKEN) => Json(admin_profile()).into_response(),
        Some(CUSTOMER_TOKEN) => Json(customer_profile()).into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Token expired"),
    }
}

async fn all_users(headers: HeaderMap) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    Json(vec![admin_profile(), customer_profile()]).into_response()
}

async fn customer_orders(State(mock): Mock, headers: HeaderMap) -> Response {
    if bearer(&headers) != Some(CUSTOMER_TOKEN) {
        return error(StatusCode::UNAUTHORIZED, "Token expired");
    }
    Json(mock.data().orders.clone()).into_response()
}

async fn create_order(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token expired");
    }
    mock.data().record("POST", "/api/orders", body);
    Json(json!({ "message": "Order created" })).into_response()
}

async fn orders_page(
    State(mock): Mock,
    headers: HeaderMap,
    Path((page, limit)): Path<(usize, usize)>,
) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let limit = limit.max(1);
    let orders = mock.data().orders.clone();
    let total_pages = orders.len().div_ceil(limit);
    let page_orders: Vec<Value> = orders
        .into_iter()
        .skip(page.saturating_sub(1) * limit)
        .take(limit)
        .collect();
    Json(json!({ "orders": page_orders, "totalPages": total_pages })).into_response()
}

async fn update_order(
    State(mock): Mock,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("PUT", format!("/api/orders/{id}"), body.clone());
    if let Some(order) = data.orders.iter_mut().find(|o| id_of(o, "orderID") == id) {
        if let (Some(fields), Some(update)) = (order.as_object_mut(), body.as_object()) {
            for (key, value) in update {
                fields.insert(key.clone(), value.clone());
            }
        }
    }
    Json(json!({ "message": "Order updated" })).into_response()
}

async fn delete_order(State(mock): Mock, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("DELETE", format!("/api/orders/{id}"), Value::Null);
    data.orders.retain(|o| id_of(o, "orderID") != id);
    Json(json!({ "message": "Order deleted" })).into_response()
}

async fn list_tickets(State(mock): Mock, headers: HeaderMap) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    Json(mock.data().tickets.clone()).into_response()
}

async fn create_ticket(State(mock): Mock, Json(body): Json<Value>) -> Json<Value> {
    let mut data = mock.data();
    data.record("POST", "/api/tickets", body.clone());
    data.tickets.push(body);
    Json(json!({ "message": "Ticket created" }))
}

async fn list_promos(State(mock): Mock, headers: HeaderMap) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    Json(mock.data().promos.clone()).into_response()
}

async fn create_promo(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let code = id_of(&body, "code");
    let mut data = mock.data();
    data.record("POST", "/api/newsletter/promos", body.clone());
    if data.promos.iter().any(|p| id_of(p, "code") == code) {
        return error(StatusCode::CONFLICT, "Promo code already exists");
    }
    data.promos.push(body);
    Json(json!({ "message": "Promo created" })).into_response()
}

async fn broadcast(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    mock.data().record("POST", "/api/newsletter/broadcast", body);
    Json(json!({ "message": "Sent" })).into_response()
}

async fn send_otp(State(mock): Mock, Json(body): Json<Value>) -> Json<Value> {
    mock.data().record("POST", "/api/newsletter/send-otp", body);
    Json(json!({ "message": "OTP sent" }))
}

async fn verify_otp(State(mock): Mock, Json(body): Json<Value>) -> Response {
    let accepted = id_of(&body, "otp") == NEWSLETTER_OTP;
    mock.data().record("POST", "/api/newsletter/verify-otp", body);
    if accepted {
        Json(json!({ "message": "Subscribed" })).into_response()
    } else {
        error(StatusCode::BAD_REQUEST, "Invalid or expired OTP")
    }
}

async fn holiday_status(State(mock): Mock) -> Json<Value> {
    Json(mock.data().holiday.clone())
}

async fn toggle_holiday(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !is_admin(&headers) {
        return error(StatusCode::FORBIDDEN, "Admins only");
    }
    let mut data = mock.data();
    data.record("POST", "/api/holiday/toggle", body.clone());
    data.holiday = body;
    Json(json!({ "message": "Holiday mode updated" })).into_response()
}

async fn spin_wheel(State(mock): Mock, headers: HeaderMap) -> Response {
    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token expired");
    }
    mock.data()
        .record("POST", "/api/christmas-features/spin-wheel", Value::Null);
    Json(json!({ "code": "SPIN10", "prize": "10% OFF" })).into_response()
}

async fn contest_spots(State(mock): Mock) -> Json<Value> {
    let remaining = mock.data().contest_spots;
    Json(json!({ "spotsRemaining": remaining, "spotsTotal": 100 }))
}

async fn enter_contest(State(mock): Mock, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Token expired");
    }
    let mut data = mock.data();
    data.record("POST", "/api/christmas-features/contest/enter", body);
    data.contest_spots = data.contest_spots.saturating_sub(1);
    Json(json!({ "isWinner": false, "spotsRemaining": data.contest_spots })).into_response()
}
