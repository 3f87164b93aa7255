//! Back-office forms: products, categories, theme, promos, broadcasts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductCode, PromoId};

/// Placeholder shown while the backend has not assigned a product code.
pub const AUTO_CODE: &str = "(auto)";

/// Description used when none is given.
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// Category used when none is selected.
pub const DEFAULT_CATEGORY: &str = "accessories";

/// Admin form failures.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminFormError {
    #[error("Product name is required")]
    MissingName,
    #[error("Valid price is required")]
    InvalidPrice,
    #[error("At least one image is required")]
    MissingImages,
    #[error("Category name is required")]
    MissingCategoryName,
    #[error("Promo code is required")]
    MissingPromoCode,
    #[error("Discount must be between 1 and 100")]
    InvalidDiscount,
    #[error("Subject and message are required")]
    MissingBroadcastFields,
    #[error("{0} must be a colour like #1a2b3c")]
    InvalidColour(&'static str),
}

/// The new-product form, auto-saved between visits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductDraft {
    pub code: String,
    pub name: String,
    /// Comma-separated alternative names.
    pub alt_names: String,
    pub labelled_price: String,
    pub price: String,
    pub description: String,
    pub stock: String,
    pub is_available: bool,
    pub categories: Vec<String>,
    pub colors: String,
    pub saved_at: Option<DateTime<Utc>>,
}

impl Default for ProductDraft {
    fn default() -> Self {
        Self {
            code: AUTO_CODE.to_owned(),
            name: String::new(),
            alt_names: String::new(),
            labelled_price: String::new(),
            price: String::new(),
            description: String::new(),
            stock: "0".to_owned(),
            is_available: true,
            categories: Vec::new(),
            colors: String::new(),
            saved_at: None,
        }
    }
}

/// Create/update body for `/api/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[serde(rename = "productId", skip_serializing_if = "Option::is_none")]
    pub code: Option<ProductCode>,
    pub name: String,
    pub alt_names: Vec<String>,
    pub price: Price,
    pub labelled_price: Price,
    pub images: Vec<String>,
    pub description: String,
    pub stock: i64,
    pub is_available: bool,
    pub category: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

/// Split a comma-separated list, dropping blanks.
#[must_use]
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

impl ProductDraft {
    /// Whether nothing worth restoring has been typed.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
            && self.alt_names.trim().is_empty()
            && self.price.trim().is_empty()
            && self.labelled_price.trim().is_empty()
            && self.description.trim().is_empty()
            && self.categories.is_empty()
    }

    /// Validate and build the create payload with the uploaded image URLs.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: name, price, images.
    pub fn into_payload(self, images: Vec<String>) -> Result<ProductPayload, AdminFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AdminFormError::MissingName);
        }
        let price = parse_price(&self.price)
            .filter(Price::is_positive)
            .ok_or(AdminFormError::InvalidPrice)?;
        if images.is_empty() {
            return Err(AdminFormError::MissingImages);
        }

        let description = self.description.trim();
        let code = self.code.trim();
        Ok(ProductPayload {
            code: (!code.is_empty() && code != AUTO_CODE).then(|| ProductCode::new(code)),
            name: name.to_owned(),
            alt_names: split_list(&self.alt_names),
            price,
            labelled_price: parse_price(&self.labelled_price).unwrap_or(price),
            images,
            description: if description.is_empty() {
                DEFAULT_DESCRIPTION
            } else {
                description
            }
            .to_owned(),
            stock: self.stock.trim().parse().unwrap_or(0).max(0),
            is_available: self.is_available,
            category: if self.categories.is_empty() {
                vec![DEFAULT_CATEGORY.to_owned()]
            } else {
                self.categories
            },
            colors: split_list(&self.colors),
            sizes: Vec::new(),
        })
    }
}

fn parse_price(input: &str) -> Option<Price> {
    input.trim().parse().ok()
}

/// The edit-product form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductEditForm {
    pub name: String,
    pub alt_names: String,
    pub labelled_price: String,
    pub price: String,
    pub description: String,
    pub stock: String,
    pub is_available: bool,
    pub categories: Vec<String>,
    pub colors_enabled: bool,
    pub colors: String,
}

impl ProductEditForm {
    /// Build the update payload.
    ///
    /// `new_images` replaces `existing_images` only when non-empty; colours
    /// are sent only when enabled; sizes are carried over unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: name, price.
    pub fn into_payload(
        self,
        new_images: Vec<String>,
        existing_images: Vec<String>,
        existing_sizes: Vec<String>,
    ) -> Result<ProductPayload, AdminFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AdminFormError::MissingName);
        }
        let price = parse_price(&self.price)
            .filter(Price::is_positive)
            .ok_or(AdminFormError::InvalidPrice)?;

        Ok(ProductPayload {
            code: None,
            name: name.to_owned(),
            alt_names: split_list(&self.alt_names),
            price,
            labelled_price: parse_price(&self.labelled_price).unwrap_or(price),
            images: if new_images.is_empty() {
                existing_images
            } else {
                new_images
            },
            description: self.description.trim().to_owned(),
            stock: self.stock.trim().parse().unwrap_or(0).max(0),
            is_available: self.is_available,
            category: self.categories,
            colors: if self.colors_enabled {
                split_list(&self.colors)
            } else {
                Vec::new()
            },
            sizes: existing_sizes,
        })
    }
}

/// New category body (`POST /api/products/categories`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewCategory {
    /// # Errors
    ///
    /// Returns [`AdminFormError::MissingCategoryName`] for a blank name.
    pub fn validate(self) -> Result<Self, AdminFormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AdminFormError::MissingCategoryName);
        }
        Ok(Self {
            name: name.to_owned(),
            description: self.description.trim().to_owned(),
        })
    }
}

/// Admin panel colours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub accent: String,
    pub bg_main: String,
    pub text_main: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: "#dc2626".to_owned(),
            bg_main: "#ffffff".to_owned(),
            text_main: "#000000".to_owned(),
        }
    }
}

fn is_hex_colour(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value.chars().skip(1).all(|c| c.is_ascii_hexdigit())
}

impl Theme {
    /// Check every colour is `#rrggbb` and lower-case them.
    ///
    /// # Errors
    ///
    /// Returns [`AdminFormError::InvalidColour`] naming the first bad field.
    pub fn validate(self) -> Result<Self, AdminFormError> {
        for (field, value) in [
            ("Accent", &self.accent),
            ("Background", &self.bg_main),
            ("Text", &self.text_main),
        ] {
            if !is_hex_colour(value.trim()) {
                return Err(AdminFormError::InvalidColour(field));
            }
        }
        Ok(Self {
            accent: self.accent.trim().to_ascii_lowercase(),
            bg_main: self.bg_main.trim().to_ascii_lowercase(),
            text_main: self.text_main.trim().to_ascii_lowercase(),
        })
    }
}

/// A promo code as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promo {
    #[serde(rename = "_id", default)]
    pub id: PromoId,
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount_percent: u8,
}

/// Promo form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub discount: i64,
}

/// New promo body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPromo {
    pub code: String,
    pub description: String,
    pub discount_percent: u8,
}

impl PromoForm {
    /// Default discount pre-filled in the form.
    pub const DEFAULT_DISCOUNT: u8 = 10;

    /// Upper-case the code and check the discount is 1..=100.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(self) -> Result<NewPromo, AdminFormError> {
        let code = self.code.trim().to_ascii_uppercase();
        if code.is_empty() {
            return Err(AdminFormError::MissingPromoCode);
        }
        let discount_percent = u8::try_from(self.discount)
            .ok()
            .filter(|d| (1..=100).contains(d))
            .ok_or(AdminFormError::InvalidDiscount)?;
        Ok(NewPromo {
            code,
            description: self.description.trim().to_owned(),
            discount_percent,
        })
    }
}

/// Newsletter broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl Broadcast {
    /// # Errors
    ///
    /// Returns [`AdminFormError::MissingBroadcastFields`] when either field is blank.
    pub fn validate(self) -> Result<Self, AdminFormError> {
        let subject = self.subject.trim();
        let message = self.message.trim();
        if subject.is_empty() || message.is_empty() {
            return Err(AdminFormError::MissingBroadcastFields);
        }
        Ok(Self {
            subject: subject.to_owned(),
            message: message.to_owned(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn draft() -> ProductDraft {
        ProductDraft {
            name: "Linen Shirt".to_owned(),
            price: "4500".to_owned(),
            ..ProductDraft::default()
        }
    }

    #[test]
    fn test_draft_validation_order() {
        let mut d = draft();
        d.name = " ".to_owned();
        d.price = String::new();
        assert_eq!(d.into_payload(vec![]), Err(AdminFormError::MissingName));

        let mut d = draft();
        d.price = "0".to_owned();
        assert_eq!(
            d.into_payload(vec!["a.jpg".to_owned()]),
            Err(AdminFormError::InvalidPrice)
        );

        let mut d = draft();
        d.price = "abc".to_owned();
        assert_eq!(d.into_payload(vec![]), Err(AdminFormError::InvalidPrice));

        assert_eq!(draft().into_payload(vec![]), Err(AdminFormError::MissingImages));
    }

    #[test]
    fn test_draft_defaults() {
        let payload = draft().into_payload(vec!["a.jpg".to_owned()]).unwrap();
        assert_eq!(payload.description, DEFAULT_DESCRIPTION);
        assert_eq!(payload.category, vec![DEFAULT_CATEGORY]);
        assert_eq!(payload.labelled_price, Price::from_rupees(4500));
        assert!(payload.code.is_none());
        assert!(payload.sizes.is_empty());
        assert_eq!(payload.stock, 0);

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("productId").is_none());
        assert_eq!(json["isAvailable"], true);
    }

    #[test]
    fn test_draft_keeps_assigned_code() {
        let mut d = draft();
        d.code = "NK-0100".to_owned();
        d.alt_names = "Shirt, , Linen top".to_owned();
        let payload = d.into_payload(vec!["a.jpg".to_owned()]).unwrap();
        assert_eq!(payload.code, Some(ProductCode::new("NK-0100")));
        assert_eq!(payload.alt_names, vec!["Shirt", "Linen top"]);
    }

    #[test]
    fn test_draft_blank() {
        assert!(ProductDraft::default().is_blank());
        assert!(!draft().is_blank());
    }

    #[test]
    fn test_edit_keeps_existing_images() {
        let form = ProductEditForm {
            name: "Shirt".to_owned(),
            price: "100".to_owned(),
            colors: "red,blue".to_owned(),
            ..ProductEditForm::default()
        };
        let payload = form
            .into_payload(vec![], vec!["old.jpg".to_owned()], vec!["M".to_owned()])
            .unwrap();
        assert_eq!(payload.images, vec!["old.jpg"]);
        assert_eq!(payload.sizes, vec!["M"]);
        assert!(payload.colors.is_empty());
    }

    #[test]
    fn test_edit_replaces_images_and_colours() {
        let form = ProductEditForm {
            name: "Shirt".to_owned(),
            price: "100".to_owned(),
            colors_enabled: true,
            colors: "red, blue".to_owned(),
            ..ProductEditForm::default()
        };
        let payload = form
            .into_payload(vec!["new.jpg".to_owned()], vec!["old.jpg".to_owned()], vec![])
            .unwrap();
        assert_eq!(payload.images, vec!["new.jpg"]);
        assert_eq!(payload.colors, vec!["red", "blue"]);
    }

    #[test]
    fn test_category_name_required() {
        let category = NewCategory {
            name: "  ".to_owned(),
            description: String::new(),
        };
        assert_eq!(category.validate(), Err(AdminFormError::MissingCategoryName));
    }

    #[test]
    fn test_theme_validation() {
        assert!(Theme::default().validate().is_ok());
        let theme = Theme {
            accent: "#DC2626".to_owned(),
            ..Theme::default()
        }
        .validate()
        .unwrap();
        assert_eq!(theme.accent, "#dc2626");

        let bad = Theme {
            bg_main: "white".to_owned(),
            ..Theme::default()
        };
        assert_eq!(bad.validate(), Err(AdminFormError::InvalidColour("Background")));
    }

    #[test]
    fn test_promo_form() {
        let promo = PromoForm {
            code: " xmas10 ".to_owned(),
            description: "Ten off".to_owned(),
            discount: 10,
        }
        .validate()
        .unwrap();
        assert_eq!(promo.code, "XMAS10");

        let json = serde_json::to_value(&promo).unwrap();
        assert_eq!(json["discountPercent"], 10);

        let zero = PromoForm {
            code: "A".to_owned(),
            discount: 0,
            ..PromoForm::default()
        };
        assert_eq!(zero.validate(), Err(AdminFormError::InvalidDiscount));
    }

    #[test]
    fn test_broadcast_requires_both_fields() {
        let broadcast = Broadcast {
            subject: "Sale".to_owned(),
            message: String::new(),
        };
        assert_eq!(
            broadcast.validate(),
            Err(AdminFormError::MissingBroadcastFields)
        );
    }
}
