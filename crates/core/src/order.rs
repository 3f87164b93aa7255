//! Placed orders, as stored by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::OrderLine;
use crate::types::{OrderId, OrderStatus, Price, ProductId};

/// Default admin page size.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// An order returned by `GET /api/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub total: Price,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Order {
    /// Whether any line of this order is for `product`.
    #[must_use]
    pub fn contains_product(&self, product: &ProductId) -> bool {
        self.items.iter().any(|line| &line.product_id == product)
    }

    /// Total number of units.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|line| line.qty).sum()
    }
}

/// Whether any of `orders` contains `product`.
#[must_use]
pub fn has_purchased(orders: &[Order], product: &ProductId) -> bool {
    orders.iter().any(|order| order.contains_product(product))
}

/// One page of orders (`GET /api/orders/{page}/{limit}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Admin edit of an order (`PUT /api/orders/{orderID}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    #[serde(default)]
    pub notes: String,
}

impl OrderUpdate {
    /// Whether applying this update would change `order`.
    #[must_use]
    pub fn differs_from(&self, order: &Order) -> bool {
        self.status != order.status || self.notes != order.notes
    }
}

/// Page number clamped to `1..=total_pages` (at least 1).
#[must_use]
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ORDER_JSON: &str = r#"{
        "orderID": "ORD00042",
        "email": "buyer@example.com",
        "name": "Nimal",
        "address": "12 Galle Road",
        "phone": "0771234567",
        "status": "pending",
        "notes": null,
        "items": [
            {"productId": "p1", "name": "Scarf", "price": 1200, "qty": 2, "image": "a.jpg"},
            {"productId": "p2", "name": "Cap", "price": 800, "qty": 1}
        ],
        "total": 3200,
        "date": "2025-12-01T10:00:00.000Z"
    }"#;

    #[test]
    fn test_deserialize_order() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        assert_eq!(order.order_id.as_str(), "ORD00042");
        assert_eq!(order.notes, "");
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.total, Price::from_rupees(3200));
        assert!(order.date.is_some());
    }

    #[test]
    fn test_has_purchased() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let orders = vec![order];
        assert!(has_purchased(&orders, &ProductId::new("p2")));
        assert!(!has_purchased(&orders, &ProductId::new("p3")));
        assert!(!has_purchased(&[], &ProductId::new("p1")));
    }

    #[test]
    fn test_update_detects_changes() {
        let order: Order = serde_json::from_str(ORDER_JSON).unwrap();
        let unchanged = OrderUpdate {
            status: OrderStatus::Pending,
            notes: String::new(),
        };
        assert!(!unchanged.differs_from(&order));

        let completed = OrderUpdate {
            status: OrderStatus::Completed,
            notes: String::new(),
        };
        assert!(completed.differs_from(&order));

        let noted = OrderUpdate {
            status: OrderStatus::Pending,
            notes: "Call before delivery".to_owned(),
        };
        assert!(noted.differs_from(&order));
    }

    #[test]
    fn test_order_page() {
        let page: OrderPage = serde_json::from_str(r#"{"orders": [], "totalPages": 3}"#).unwrap();
        assert_eq!(page.total_pages, 3);
        assert_eq!(clamp_page(7, page.total_pages), 3);
        assert_eq!(clamp_page(0, 0), 1);
    }
}
