//! Christmas promotions on the storefront against the mock backend.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use nikola_integration_tests::{
    CUSTOMER_EMAIL, MockBackend, PASSWORD, client, location, spawn_storefront,
};

const OFFERS: &str = "/christmas-offers";

struct Shop {
    backend: MockBackend,
    base: String,
    client: reqwest::Client,
    _dist: tempfile::TempDir,
}

async fn shop(holiday: bool) -> Shop {
    let backend = MockBackend::new();
    backend.data().holiday = json!({ "enabled": holiday, "discount": 25 });
    let dist = tempfile::tempdir().unwrap();
    std::fs::write(dist.path().join("index.html"), "<div id=\"root\"></div>").unwrap();
    let backend_url = backend.spawn().await;
    let base = spawn_storefront(&backend_url, dist.path().to_path_buf()).await;
    Shop {
        backend,
        base,
        client: client(),
        _dist: dist,
    }
}

impl Shop {
    async fn log_in(&self) {
        let response = self
            .client
            .post(format!("{}/login", self.base))
            .form(&[("email", CUSTOMER_EMAIL), ("password", PASSWORD)])
            .send()
            .await
            .unwrap();
        assert_eq!(location(&response), "/");
    }

    async fn post(&self, path: &str) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base))
            .form(&[("next", OFFERS)])
            .send()
            .await
            .unwrap()
    }

    async fn toasts(&self) -> String {
        self.client
            .get(format!("{}/cart", self.base))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }
}

#[tokio::test]
async fn test_spin_needs_login() {
    let shop = shop(true).await;

    let response = shop.post("/christmas/spin").await;
    assert_eq!(location(&response), "/login");
    assert!(
        shop.backend
            .requests_to("POST", "/api/christmas-features/spin-wheel")
            .is_empty()
    );
}

#[tokio::test]
async fn test_spin_shows_prize() {
    let shop = shop(true).await;
    shop.log_in().await;

    let response = shop.post("/christmas/spin").await;
    assert_eq!(location(&response), OFFERS);
    assert_eq!(
        shop.backend
            .requests_to("POST", "/api/christmas-features/spin-wheel")
            .len(),
        1
    );

    let offers = shop
        .client
        .get(format!("{}{OFFERS}", shop.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(offers.contains("Code: SPIN10"));
}

#[tokio::test]
async fn test_spin_outside_holiday_mode_skips_backend() {
    let shop = shop(false).await;
    shop.log_in().await;

    shop.post("/christmas/spin").await;
    assert!(
        shop.backend
            .requests_to("POST", "/api/christmas-features/spin-wheel")
            .is_empty()
    );
    assert!(
        shop.toasts()
            .await
            .contains("Christmas offers are not running right now")
    );
}

#[tokio::test]
async fn test_contest_entry_once_per_session() {
    let shop = shop(true).await;
    shop.log_in().await;

    shop.post("/christmas/contest").await;
    let toasts = shop.toasts().await;
    assert!(toasts.contains("Entry submitted! 41 spots left!"));

    let again = shop.post("/christmas/contest").await;
    assert_eq!(location(&again), OFFERS);
    assert!(
        shop.toasts()
            .await
            .contains("You have already entered the contest")
    );
    assert_eq!(
        shop.backend
            .requests_to("POST", "/api/christmas-features/contest/enter")
            .len(),
        1
    );
    assert_eq!(shop.backend.data().contest_spots, 41);
}

#[tokio::test]
async fn test_advent_door_opens_once_a_day() {
    let shop = shop(true).await;

    let first = shop.post("/christmas/calendar/1").await;
    assert_eq!(location(&first), OFFERS);
    assert!(shop.toasts().await.contains("Day 1: 5% OFF"));

    shop.post("/christmas/calendar/1").await;
    assert!(shop.toasts().await.contains("Come back tomorrow!"));
}

#[tokio::test]
async fn test_advent_rejects_unknown_door() {
    let shop = shop(true).await;

    shop.post("/christmas/calendar/25").await;
    assert!(shop.toasts().await.contains("There is no door 25"));
}
