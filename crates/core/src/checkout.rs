//! Checkout and payment.
//!
//! Checkout collects shipping details and freezes the cart into an
//! [`OrderDraft`]. Payment validates a card form and turns the draft into the
//! backend's order payload. No card data ever leaves the server; the backend
//! only receives the order.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartSummary, shipping_for};
use crate::types::{Price, ProductId};

/// Orders ship within Sri Lanka only.
pub const COUNTRY: &str = "Sri Lanka";

/// The only payment method the store offers.
pub const PAYMENT_METHOD: &str = "card";

/// Shipping form validation failures, in the order they are checked.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,
    #[error("Please enter your full name")]
    MissingName,
    #[error("Please enter your address")]
    MissingAddress,
    #[error("Please enter your phone number")]
    MissingPhone,
    #[error("Please enter your city")]
    MissingCity,
}

/// Shipping details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub full_name: String,
    /// Optional; pre-filled from the account profile when logged in.
    #[serde(default)]
    pub email: String,
    pub address: String,
    pub phone: String,
    pub city: String,
}

impl ShippingDetails {
    /// Check required fields: name, address, phone, city.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.full_name.trim().is_empty() {
            return Err(CheckoutError::MissingName);
        }
        if self.address.trim().is_empty() {
            return Err(CheckoutError::MissingAddress);
        }
        if self.phone.trim().is_empty() {
            return Err(CheckoutError::MissingPhone);
        }
        if self.city.trim().is_empty() {
            return Err(CheckoutError::MissingCity);
        }
        Ok(())
    }
}

/// An order line as the backend expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub qty: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
}

impl OrderLine {
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// A validated, not yet paid order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub shipping: ShippingDetails,
    pub items: Vec<OrderLine>,
}

/// `POST /api/orders` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest<'a> {
    pub address: &'a str,
    pub phone: &'a str,
    pub city: &'a str,
    pub email: &'a str,
    pub items: &'a [OrderLine],
    pub payment_method: &'static str,
}

impl OrderDraft {
    /// Freeze `cart` with validated `shipping` details.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart, or the first
    /// missing shipping field.
    pub fn from_cart(cart: &Cart, shipping: ShippingDetails) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        shipping.validate()?;

        let items = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product_id.clone(),
                name: item.name.clone(),
                price: item.price,
                qty: item.quantity,
                image: item.image.clone().unwrap_or_default(),
                size: item.size.clone().unwrap_or_default(),
                color: item.color.clone().unwrap_or_default(),
            })
            .collect();

        Ok(Self { shipping, items })
    }

    /// Subtotal, shipping, tax and total for the frozen lines.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        let subtotal: Price = self.items.iter().map(OrderLine::line_total).sum();
        let shipping = shipping_for(subtotal);
        CartSummary {
            subtotal,
            shipping,
            tax: Price::ZERO,
            total: subtotal + shipping,
        }
    }

    /// Backend payload for this draft.
    #[must_use]
    pub fn request(&self) -> OrderRequest<'_> {
        OrderRequest {
            address: &self.shipping.address,
            phone: &self.shipping.phone,
            city: &self.shipping.city,
            email: &self.shipping.email,
            items: &self.items,
            payment_method: PAYMENT_METHOD,
        }
    }
}

/// Card form validation failures.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Please fill all payment fields")]
    MissingFields,
    #[error("Card number must be 16 digits")]
    InvalidCardNumber,
    #[error("CVV must be 3 digits")]
    InvalidCvv,
}

/// Card details from the payment form.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentCard {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub expiry_month: String,
    #[serde(default)]
    pub expiry_year: String,
    #[serde(default)]
    pub cvv: String,
}

impl std::fmt::Debug for PaymentCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentCard")
            .field("card_number", &"[REDACTED]")
            .field("card_name", &self.card_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvv", &"[REDACTED]")
            .finish()
    }
}

fn digits(input: &str, max: usize) -> String {
    input.chars().filter(char::is_ascii_digit).take(max).collect()
}

impl PaymentCard {
    /// Strip non-digits and truncate: number 16, month 2, year 2, cvv 3.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            card_number: digits(&self.card_number, 16),
            card_name: self.card_name.trim().to_owned(),
            expiry_month: digits(&self.expiry_month, 2),
            expiry_year: digits(&self.expiry_year, 2),
            cvv: digits(&self.cvv, 3),
        }
    }

    /// Validate a sanitized card.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if [
            &self.card_number,
            &self.card_name,
            &self.expiry_month,
            &self.expiry_year,
            &self.cvv,
        ]
        .iter()
        .any(|field| field.is_empty())
        {
            return Err(PaymentError::MissingFields);
        }
        if self.card_number.len() != 16 {
            return Err(PaymentError::InvalidCardNumber);
        }
        if self.cvv.len() != 3 {
            return Err(PaymentError::InvalidCvv);
        }
        Ok(())
    }

    /// Last four digits, for confirmation messages.
    #[must_use]
    pub fn last_four(&self) -> &str {
        let len = self.card_number.len();
        self.card_number.get(len.saturating_sub(4)..).unwrap_or_default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use crate::catalog::tests::product;

    fn shipping() -> ShippingDetails {
        ShippingDetails {
            full_name: "Nimal Perera".to_owned(),
            email: String::new(),
            address: "12 Galle Road".to_owned(),
            phone: "0771234567".to_owned(),
            city: "Colombo".to_owned(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::default();
        cart.add(CartItem::from_product(
            &product("p1", &["men"], 1200),
            Price::from_rupees(1200),
            2,
            Some("M".to_owned()),
            None,
        ));
        cart
    }

    #[test]
    fn test_validate_order_of_checks() {
        let mut details = ShippingDetails::default();
        assert_eq!(details.validate(), Err(CheckoutError::MissingName));
        details.full_name = "A".to_owned();
        assert_eq!(details.validate(), Err(CheckoutError::MissingAddress));
        details.address = "B".to_owned();
        assert_eq!(details.validate(), Err(CheckoutError::MissingPhone));
        details.phone = "C".to_owned();
        assert_eq!(details.validate(), Err(CheckoutError::MissingCity));
        details.city = "   ".to_owned();
        assert_eq!(details.validate(), Err(CheckoutError::MissingCity));
    }

    #[test]
    fn test_email_is_optional() {
        assert!(shipping().validate().is_ok());
    }

    #[test]
    fn test_draft_requires_items() {
        let result = OrderDraft::from_cart(&Cart::default(), shipping());
        assert_eq!(result, Err(CheckoutError::EmptyCart));
    }

    #[test]
    fn test_request_payload() {
        let draft = OrderDraft::from_cart(&cart(), shipping()).unwrap();
        let json = serde_json::to_value(draft.request()).unwrap();

        assert_eq!(json["paymentMethod"], "card");
        assert_eq!(json["city"], "Colombo");
        assert_eq!(json["email"], "");
        assert_eq!(json["items"][0]["productId"], "p1");
        assert_eq!(json["items"][0]["qty"], 2);
        assert_eq!(json["items"][0]["size"], "M");
        assert_eq!(json["items"][0]["color"], "");
        assert!(json.get("fullName").is_none());
    }

    #[test]
    fn test_draft_summary() {
        let draft = OrderDraft::from_cart(&cart(), shipping()).unwrap();
        let summary = draft.summary();
        assert_eq!(summary.subtotal, Price::from_rupees(2400));
        assert_eq!(summary.total, Price::from_rupees(2700));
    }

    #[test]
    fn test_sanitize_card() {
        let card = PaymentCard {
            card_number: "4111 1111-1111 1111 99".to_owned(),
            card_name: " N PERERA ".to_owned(),
            expiry_month: "1/2".to_owned(),
            expiry_year: "2027".to_owned(),
            cvv: "12a34".to_owned(),
        }
        .sanitize();

        assert_eq!(card.card_number, "4111111111111111");
        assert_eq!(card.card_name, "N PERERA");
        assert_eq!(card.expiry_month, "12");
        assert_eq!(card.expiry_year, "20");
        assert_eq!(card.cvv, "123");
        assert_eq!(card.last_four(), "1111");
        assert!(card.validate().is_ok());
    }

    #[test]
    fn test_validate_card() {
        let mut card = PaymentCard {
            card_number: "4111".to_owned(),
            card_name: "N".to_owned(),
            expiry_month: "12".to_owned(),
            expiry_year: "27".to_owned(),
            cvv: "12".to_owned(),
        };
        assert_eq!(card.validate(), Err(PaymentError::InvalidCardNumber));
        card.card_number = "4111111111111111".to_owned();
        assert_eq!(card.validate(), Err(PaymentError::InvalidCvv));
        card.card_name = String::new();
        assert_eq!(card.validate(), Err(PaymentError::MissingFields));
    }

    #[test]
    fn test_debug_redacts_card() {
        let card = PaymentCard {
            card_number: "4111111111111111".to_owned(),
            cvv: "123".to_owned(),
            ..PaymentCard::default()
        };
        let debug = format!("{card:?}");
        assert!(!debug.contains("4111"));
        assert!(!debug.contains("123"));
    }
}
