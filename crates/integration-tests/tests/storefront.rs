//! Storefront flows against the mock backend.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;

use nikola_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, MockBackend, NEWSLETTER_OTP, PASSWORD, client, location,
    spawn_storefront,
};

fn empty_dist() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
    dir
}

async fn storefront(backend: &MockBackend, dist: &tempfile::TempDir) -> String {
    let backend_url = backend.spawn().await;
    spawn_storefront(&backend_url, dist.path().to_path_buf()).await
}

async fn log_in(client: &reqwest::Client, base: &str) {
    let response = client
        .post(format!("{base}/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/");
}

async fn page(client: &reqwest::Client, url: String) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

async fn add_mugs(client: &reqwest::Client, base: &str, quantity: &str) {
    let response = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "p1"), ("quantity", quantity)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_health_and_readiness() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();

    let health = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await.unwrap(), "ok");

    let ready = client.get(format!("{base}/health/ready")).send().await.unwrap();
    assert_eq!(ready.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_readiness_fails_without_backend() {
    let dist = empty_dist();
    let base = spawn_storefront("http://127.0.0.1:9", dist.path().to_path_buf()).await;

    let ready = client()
        .get(format!("{base}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(ready.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_home_lists_featured_products() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let response = client().get(format!("{base}/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("Santa Mug"));
}

#[tokio::test]
async fn test_product_search() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let body = client()
        .get(format!("{base}/products?q=mug"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Santa Mug"));
    assert!(!body.contains("Elf Hat"));
}

#[tokio::test]
async fn test_holiday_status_json() {
    let backend = MockBackend::new();
    backend.data().holiday = serde_json::json!({ "enabled": true, "discount": 30 });
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let status: serde_json::Value = client()
        .get(format!("{base}/api/holiday"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["enabled"], true);
    assert_eq!(status["discount"], 30);
}

#[tokio::test]
async fn test_add_to_cart_updates_cart_and_badge() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();

    let empty = client.get(format!("{base}/cart")).send().await.unwrap();
    assert!(empty.text().await.unwrap().contains("Your cart is empty"));

    let added = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "p1"), ("quantity", "2"), ("color", "red")])
        .send()
        .await
        .unwrap();
    assert_eq!(added.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&added), "/cart");

    let cart = client
        .get(format!("{base}/cart"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(cart.contains("Santa Mug"));
    assert!(cart.contains("Santa Mug added to cart"));

    let badge = client
        .get(format!("{base}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(badge.contains(">2</span>"));
}

#[tokio::test]
async fn test_out_of_stock_product_is_not_added() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();

    let response = client
        .post(format!("{base}/cart/add"))
        .form(&[("product_id", "p2"), ("next", "/products")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products");

    let badge = client
        .get(format!("{base}/cart/count"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(badge.contains(">0</span>"));
}

#[tokio::test]
async fn test_login_redirects_by_role() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let customer = client()
        .post(format!("{base}/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&customer), "/");

    let admin = client()
        .post(format!("{base}/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&admin), "http://localhost:3001");

    let rejected = client()
        .post(format!("{base}/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&rejected), "/login");
}

#[tokio::test]
async fn test_contact_form_reaches_backend() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let response = client()
        .post(format!("{base}/contact-us"))
        .form(&[
            ("name", "Amaya Silva"),
            ("email", CUSTOMER_EMAIL),
            ("subject", "Gift wrap"),
            ("message", "Can you gift wrap my order?"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let tickets = backend.requests_to("POST", "/api/tickets");
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets.last().unwrap().body["email"], CUSTOMER_EMAIL);
}

#[tokio::test]
async fn test_spa_fallback() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    std::fs::create_dir(dist.path().join("assets")).unwrap();
    std::fs::write(dist.path().join("assets/app.js"), "console.log(1);").unwrap();
    let base = storefront(&backend, &dist).await;
    let client = client();

    let asset = client
        .get(format!("{base}/assets/app.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(asset.status(), StatusCode::OK);
    assert_eq!(asset.text().await.unwrap(), "console.log(1);");

    let route = client
        .get(format!("{base}/account/orders/42"))
        .send()
        .await
        .unwrap();
    assert_eq!(route.status(), StatusCode::OK);
    assert!(route.text().await.unwrap().contains("id=\"root\""));

    let missing = client
        .get(format!("{base}/assets/missing.css"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unmatched_post_is_not_found() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;

    let response = client()
        .post(format!("{base}/some/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_and_payment_place_order() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();
    log_in(&client, &base).await;
    add_mugs(&client, &base, "2").await;

    let shipping = client
        .post(format!("{base}/checkout"))
        .form(&[
            ("full_name", "Amaya Silva"),
            ("email", CUSTOMER_EMAIL),
            ("address", "12 Galle Road"),
            ("phone", "0771234567"),
            ("city", "Colombo"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&shipping), "/payment");

    let payment_page = client.get(format!("{base}/payment")).send().await.unwrap();
    assert_eq!(payment_page.status(), StatusCode::OK);

    let paid = client
        .post(format!("{base}/payment"))
        .form(&[
            ("card_number", "4111 1111 1111 1111"),
            ("card_name", "Amaya Silva"),
            ("expiry_month", "12"),
            ("expiry_year", "30"),
            ("cvv", "123"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&paid), "/products");

    let orders = backend.requests_to("POST", "/api/orders");
    assert_eq!(orders.len(), 1);
    let order = &orders[0].body;
    assert_eq!(order["city"], "Colombo");
    assert_eq!(order["email"], CUSTOMER_EMAIL);
    assert_eq!(order["paymentMethod"], "card");
    assert_eq!(order["items"][0]["productId"], "p1");
    assert_eq!(order["items"][0]["qty"], 2);
    assert_eq!(order["items"][0]["price"], 1500.0);
    assert!(order.get("cardNumber").is_none());

    let badge = page(&client, format!("{base}/cart/count")).await;
    assert!(badge.contains(">0</span>"));

    let again = client.get(format!("{base}/payment")).send().await.unwrap();
    assert_eq!(location(&again), "/cart");
}

#[tokio::test]
async fn test_checkout_rejects_missing_city_and_bad_card() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();
    log_in(&client, &base).await;
    add_mugs(&client, &base, "1").await;

    let missing_city = client
        .post(format!("{base}/checkout"))
        .form(&[
            ("full_name", "Amaya Silva"),
            ("address", "12 Galle Road"),
            ("phone", "0771234567"),
            ("city", " "),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&missing_city), "/checkout");

    client
        .post(format!("{base}/checkout"))
        .form(&[
            ("full_name", "Amaya Silva"),
            ("address", "12 Galle Road"),
            ("phone", "0771234567"),
            ("city", "Colombo"),
        ])
        .send()
        .await
        .unwrap();
    let bad_card = client
        .post(format!("{base}/payment"))
        .form(&[
            ("card_number", "4111"),
            ("card_name", "Amaya Silva"),
            ("expiry_month", "12"),
            ("expiry_year", "30"),
            ("cvv", "123"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&bad_card), "/payment");
    assert!(backend.requests_to("POST", "/api/orders").is_empty());

    let cart = page(&client, format!("{base}/cart")).await;
    assert!(cart.contains("Card number must be 16 digits"));
    assert!(cart.contains("Santa Mug"));
}

#[tokio::test]
async fn test_review_requires_a_purchase() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let review = [
        ("name", "Amaya"),
        ("email", CUSTOMER_EMAIL),
        ("rating", "5"),
        ("comment", "Lovely glaze"),
    ];

    let anonymous = client();
    let rejected = anonymous
        .post(format!("{base}/overview/p1/reviews"))
        .form(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&rejected), "/overview/p1#reviews");
    let toast = page(&anonymous, format!("{base}/cart")).await;
    assert!(toast.contains("Only verified buyers can leave reviews"));
    let posted = backend.requests_to("POST", "/api/products/p1/reviews");
    assert!(posted.is_empty());

    let buyer = client();
    log_in(&buyer, &base).await;
    let accepted = buyer
        .post(format!("{base}/overview/p1/reviews"))
        .form(&review)
        .send()
        .await
        .unwrap();
    assert_eq!(location(&accepted), "/overview/p1#reviews");

    let posted = backend.requests_to("POST", "/api/products/p1/reviews");
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].body["rating"], 5);
    assert_eq!(posted[0].body["email"], CUSTOMER_EMAIL);
    assert_eq!(posted[0].body["comment"], "Lovely glaze");
}

#[tokio::test]
async fn test_review_of_unbought_product_is_rejected() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();
    log_in(&client, &base).await;

    client
        .post(format!("{base}/overview/p2/reviews"))
        .form(&[("email", CUSTOMER_EMAIL), ("rating", "4"), ("comment", "Cute")])
        .send()
        .await
        .unwrap();
    let posted = backend.requests_to("POST", "/api/products/p2/reviews");
    assert!(posted.is_empty());
}

#[tokio::test]
async fn test_wishlist_toggle_and_remove() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();
    let toggle = || {
        client
            .post(format!("{base}/wishlist/toggle"))
            .form(&[("product_id", "p1")])
            .send()
    };

    let added = toggle().await.unwrap();
    assert_eq!(location(&added), "/wishlist");
    let wishlist = page(&client, format!("{base}/wishlist")).await;
    assert!(wishlist.contains("Added to wishlist"));
    assert!(wishlist.contains("Santa Mug"));

    toggle().await.unwrap();
    let wishlist = page(&client, format!("{base}/wishlist")).await;
    assert!(wishlist.contains("Removed from wishlist"));
    assert!(wishlist.contains("Nothing saved yet"));

    toggle().await.unwrap();
    let removed = client
        .post(format!("{base}/wishlist/remove"))
        .form(&[("product_id", "p1")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&removed), "/wishlist");
    let wishlist = page(&client, format!("{base}/wishlist")).await;
    assert!(wishlist.contains("Nothing saved yet"));
}

#[tokio::test]
async fn test_newsletter_otp_and_verify() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();

    let sent = client
        .post(format!("{base}/newsletter/otp"))
        .form(&[("email", "reader@nikola.lk"), ("next", "/about-us")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&sent), "/about-us");
    let otp_requests = backend.requests_to("POST", "/api/newsletter/send-otp");
    assert_eq!(otp_requests.len(), 1);
    assert_eq!(otp_requests[0].body["email"], "reader@nikola.lk");

    client
        .post(format!("{base}/newsletter/verify"))
        .form(&[("email", "reader@nikola.lk"), ("otp", "000000")])
        .send()
        .await
        .unwrap();
    let toast = page(&client, format!("{base}/cart")).await;
    assert!(toast.contains("Invalid or expired OTP"));

    client
        .post(format!("{base}/newsletter/verify"))
        .form(&[("email", "reader@nikola.lk"), ("otp", NEWSLETTER_OTP)])
        .send()
        .await
        .unwrap();
    let toast = page(&client, format!("{base}/cart")).await;
    assert!(toast.contains("Subscribed to our newsletter!"));
    let verifications = backend.requests_to("POST", "/api/newsletter/verify-otp");
    assert_eq!(verifications.len(), 2);
}

#[tokio::test]
async fn test_newsletter_blank_otp_skips_backend() {
    let backend = MockBackend::new();
    let dist = empty_dist();
    let base = storefront(&backend, &dist).await;
    let client = client();

    client
        .post(format!("{base}/newsletter/verify"))
        .form(&[("email", "reader@nikola.lk"), ("otp", "  ")])
        .send()
        .await
        .unwrap();
    let verifications = backend.requests_to("POST", "/api/newsletter/verify-otp");
    assert!(verifications.is_empty());
    let toast = page(&client, format!("{base}/cart")).await;
    assert!(toast.contains("Enter OTP"));
}
