//! Admin panel flows against the mock backend.

#![allow(clippy::unwrap_used)]

use reqwest::{Client, StatusCode, multipart};
use serde_json::json;

use nikola_integration_tests::{
    ADMIN_EMAIL, CUSTOMER_EMAIL, MockBackend, PASSWORD, client, location, spawn_admin,
};

async fn admin(backend: &MockBackend) -> String {
    let backend_url = backend.spawn().await;
    spawn_admin(&backend_url).await
}

async fn logged_in(base: &str) -> Client {
    let client = client();
    let response = client
        .post(format!("{base}/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/");
    client
}

async fn page(client: &Client, url: String) -> String {
    client.get(url).send().await.unwrap().text().await.unwrap()
}

#[tokio::test]
async fn test_pages_require_login() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = client();

    let html = client.get(format!("{base}/orders")).send().await.unwrap();
    assert_eq!(html.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&html), "/login");

    let json = client
        .get(format!("{base}/orders"))
        .header("Accept", "application/json")
        .send()
        .await
        .unwrap();
    assert_eq!(json.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_login_shows_dashboard() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let dashboard = page(&client, format!("{base}/")).await;
    assert!(dashboard.contains("Welcome back, Nimal Perera"));
    assert!(dashboard.contains("ORD0001"));

    let login = client.get(format!("{base}/login")).send().await.unwrap();
    assert_eq!(location(&login), "/");
}

#[tokio::test]
async fn test_customer_account_is_turned_away() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = client();

    let response = client
        .post(format!("{base}/login"))
        .form(&[("email", CUSTOMER_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/login?error=not_admin");

    let login = page(&client, format!("{base}/login?error=not_admin")).await;
    assert!(login.contains("You are not authorized."));

    let dashboard = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(location(&dashboard), "/login");
}

#[tokio::test]
async fn test_wrong_password_rerenders_login() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;

    let response = client()
        .post(format!("{base}/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Invalid credentials"));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(location(&response), "/login?success=logged_out");

    let dashboard = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(location(&dashboard), "/login");
}

#[tokio::test]
async fn test_order_listing_paginates() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let first = page(&client, format!("{base}/orders?page=1&limit=5")).await;
    assert!(first.contains("ORD0001"));
    assert!(first.contains("ORD0003"));

    // Past the end is clamped to the last page
    let clamped = page(&client, format!("{base}/orders?page=9&limit=5")).await;
    assert!(clamped.contains("ORD0003"));
}

#[tokio::test]
async fn test_order_update_reaches_backend() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let detail = page(&client, format!("{base}/orders/ORD0002?page=1&limit=5")).await;
    assert!(detail.contains("Amaya Silva"));
    assert!(detail.contains("12 Galle Road"));

    let response = client
        .post(format!("{base}/orders/ORD0002"))
        .form(&[
            ("status", "completed"),
            ("notes", "Shipped with DHL"),
            ("page", "1"),
            ("limit", "5"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/orders/ORD0002?page=1&limit=5&success=Order%20updated"
    );

    let puts = backend.requests_to("PUT", "/api/orders/ORD0002");
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts.last().unwrap().body,
        json!({ "status": "completed", "notes": "Shipped with DHL" })
    );
}

#[tokio::test]
async fn test_unchanged_order_skips_backend() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/orders/ORD0001"))
        .form(&[("status", "pending"), ("notes", ""), ("page", "1"), ("limit", "5")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/orders/ORD0001?page=1&limit=5&success=No%20changes"
    );
    assert!(backend.requests_to("PUT", "/api/orders/ORD0001").is_empty());
}

#[tokio::test]
async fn test_order_delete_returns_to_listing() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/orders/ORD0003/delete"))
        .form(&[("page", "2"), ("limit", "10")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/orders?page=2&limit=10&success=Order%20deleted"
    );
    assert_eq!(backend.data().orders.len(), 2);
}

#[tokio::test]
async fn test_holiday_toggle() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/settings/holiday"))
        .form(&[("enabled", "on"), ("discount", "40")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/settings?success=Holiday%20mode%20on%20at%2040%25%20off"
    );
    let toggles = backend.requests_to("POST", "/api/holiday/toggle");
    assert_eq!(
        toggles.last().unwrap().body,
        json!({ "enabled": true, "discount": 40 })
    );

    let settings = page(&client, format!("{base}/settings")).await;
    assert!(settings.contains("XMAS10"));

    let rejected = client
        .post(format!("{base}/settings/holiday"))
        .form(&[("enabled", "on"), ("discount", "lots")])
        .send()
        .await
        .unwrap();
    assert!(location(&rejected).starts_with("/settings?error="));
    assert_eq!(backend.requests_to("POST", "/api/holiday/toggle").len(), 1);
}

#[tokio::test]
async fn test_theme_is_served_as_css() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let css = client.get(format!("{base}/theme.css")).send().await.unwrap();
    assert!(
        css.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/css")
    );
    assert!(css.text().await.unwrap().contains("--accent: #dc2626;"));

    let saved = client
        .post(format!("{base}/settings/theme"))
        .form(&[
            ("accent", "#16a34a"),
            ("bgMain", "#ffffff"),
            ("textMain", "#111111"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&saved), "/settings?success=Theme%20saved");

    let css = page(&client, format!("{base}/theme.css")).await;
    assert!(css.contains("--accent: #16a34a;"));
    assert!(css.contains("--text-main: #111111;"));

    let bad = client
        .post(format!("{base}/settings/theme"))
        .form(&[
            ("accent", "red; }"),
            ("bgMain", "#ffffff"),
            ("textMain", "#111111"),
        ])
        .send()
        .await
        .unwrap();
    assert!(location(&bad).starts_with("/settings?error="));
    assert!(page(&client, format!("{base}/theme.css")).await.contains("--accent: #16a34a;"));
}

#[tokio::test]
async fn test_category_create_validates_name() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let blank = client
        .post(format!("{base}/categories"))
        .form(&[("name", "  "), ("description", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&blank),
        "/categories?error=Category%20name%20is%20required"
    );
    assert!(backend.requests_to("POST", "/api/products/categories").is_empty());

    let created = client
        .post(format!("{base}/categories"))
        .form(&[("name", "Decor"), ("description", "Tree ornaments")])
        .send()
        .await
        .unwrap();
    assert_eq!(location(&created), "/categories?success=Category%20added");

    let listing = page(&client, format!("{base}/categories")).await;
    assert!(listing.contains("Decor"));
    assert!(listing.contains("Kitchen"));
}

#[tokio::test]
async fn test_users_and_contacts_pages() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let users = page(&client, format!("{base}/users")).await;
    assert!(users.contains(CUSTOMER_EMAIL));
    assert!(users.contains("Nimal Perera"));

    let contacts = page(&client, format!("{base}/contacts")).await;
    assert!(contacts.contains("When will my mug arrive?"));
}

fn product_form(with_image: bool) -> multipart::Form {
    let form = multipart::Form::new()
        .text("code", "(auto)")
        .text("name", "Reindeer Jumper")
        .text("price", "4500")
        .text("labelled_price", "5000")
        .text("stock", "12")
        .text("is_available", "on")
        .text("categories", "kitchen")
        .text("colors", "red, green");
    if with_image {
        form.part(
            "images",
            multipart::Part::bytes(b"\x89PNG fake".to_vec())
                .file_name("jumper.png")
                .mime_str("image/png")
                .unwrap(),
        )
    } else {
        form
    }
}

#[tokio::test]
async fn test_product_create_uploads_images_first() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/products/new"))
        .multipart(product_form(true))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products?success=Product%20added");

    let uploads = backend.requests_to("POST", "/api/products/upload-image");
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads.last().unwrap().body["file"], "jumper.png");

    let creates = backend.requests_to("POST", "/api/products");
    let created = &creates.last().unwrap().body;
    assert_eq!(created["name"], "Reindeer Jumper");
    assert_eq!(created["images"], json!(["https://cdn.test/jumper.png"]));
    assert_eq!(created["category"], json!(["kitchen"]));
    assert_eq!(created["colors"], json!(["red", "green"]));
    assert_eq!(created["price"].as_f64(), Some(4500.0));
    assert!(created.get("productId").is_none());

    let listing = page(&client, format!("{base}/products")).await;
    assert!(listing.contains("Reindeer Jumper"));
}

#[tokio::test]
async fn test_product_without_images_keeps_draft() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/products/new"))
        .multipart(product_form(false))
        .send()
        .await
        .unwrap();
    assert_eq!(
        location(&response),
        "/products/new?error=At%20least%20one%20image%20is%20required"
    );
    assert!(backend.requests_to("POST", "/api/products").is_empty());

    let form = page(&client, format!("{base}/products/new")).await;
    assert!(form.contains("value=\"Reindeer Jumper\""));
}

#[tokio::test]
async fn test_draft_save_and_clear() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let saved = client
        .post(format!("{base}/products/new/draft"))
        .multipart(product_form(false))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&saved), "/products/new?success=draft_saved");

    let restored = page(&client, format!("{base}/products/new?success=draft_saved")).await;
    assert!(restored.contains("Draft saved."));
    assert!(restored.contains("value=\"Reindeer Jumper\""));
    assert!(restored.contains("Draft restored"));

    let cleared = client
        .post(format!("{base}/products/new/draft/clear"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&cleared), "/products/new?success=draft_cleared");

    let fresh = page(&client, format!("{base}/products/new")).await;
    assert!(!fresh.contains("Reindeer Jumper"));
    assert!(fresh.contains("value=\"(auto)\""));
}

#[tokio::test]
async fn test_product_delete() {
    let backend = MockBackend::new();
    let base = admin(&backend).await;
    let client = logged_in(&base).await;

    let response = client
        .post(format!("{base}/products/p2/delete"))
        .send()
        .await
        .unwrap();
    assert_eq!(location(&response), "/products?success=Product%20deleted");
    assert_eq!(backend.requests_to("DELETE", "/api/products/p2").len(), 1);
}
