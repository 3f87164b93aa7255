//! Gift finder quiz.
//!
//! Four questions narrow the catalog down to a handful of suggestions: the
//! recipient and style become a search query, the budget filters by price.

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::Price;

/// Most suggestions shown.
pub const MAX_SUGGESTIONS: usize = 6;

/// Clothing sizes offered in the last question.
pub const SIZES: [&str; 6] = ["XS", "S", "M", "L", "XL", "XXL"];

/// Who the gift is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recipient {
    Men,
    Women,
    Kids,
    Unisex,
}

impl Recipient {
    pub const ALL: [Self; 4] = [Self::Men, Self::Women, Self::Kids, Self::Unisex];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Men => "Men",
            Self::Women => "Women",
            Self::Kids => "Kids",
            Self::Unisex => "Unisex",
        }
    }

    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::Men => "men",
            Self::Women => "women",
            Self::Kids => "kids",
            Self::Unisex => "unisex",
        }
    }
}

/// The recipient's style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Classic,
    Modern,
    Sporty,
    Bold,
}

impl Style {
    pub const ALL: [Self; 4] = [Self::Classic, Self::Modern, Self::Sporty, Self::Bold];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Modern => "Modern",
            Self::Sporty => "Sporty",
            Self::Bold => "Bold",
        }
    }

    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Modern => "modern",
            Self::Sporty => "sporty",
            Self::Bold => "bold",
        }
    }
}

/// Budget bracket, in rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Budget {
    Under5k,
    From5kTo10k,
    From10kTo20k,
    Over20k,
}

impl Budget {
    pub const ALL: [Self; 4] = [
        Self::Under5k,
        Self::From5kTo10k,
        Self::From10kTo20k,
        Self::Over20k,
    ];

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Under5k => "Under Rs. 5,000",
            Self::From5kTo10k => "Rs. 5,000-10,000",
            Self::From10kTo20k => "Rs. 10,000-20,000",
            Self::Over20k => "Rs. 20,000+",
        }
    }

    #[must_use]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::Under5k => "under5k",
            Self::From5kTo10k => "from5k_to10k",
            Self::From10kTo20k => "from10k_to20k",
            Self::Over20k => "over20k",
        }
    }

    /// Inclusive bounds; the top bracket is open-ended.
    #[must_use]
    pub fn bounds(&self) -> (Price, Option<Price>) {
        let (min, max) = match self {
            Self::Under5k => (0, Some(5_000)),
            Self::From5kTo10k => (5_000, Some(10_000)),
            Self::From10kTo20k => (10_000, Some(20_000)),
            Self::Over20k => (20_000, None),
        };
        (Price::from_rupees(min), max.map(Price::from_rupees))
    }

    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let (min, max) = self.bounds();
        price >= min && max.is_none_or(|max| price <= max)
    }
}

/// Completed quiz answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftQuiz {
    pub recipient: Recipient,
    pub style: Style,
    pub budget: Budget,
    #[serde(default)]
    pub size: Option<String>,
}

impl GiftQuiz {
    /// Search text sent to the catalog, e.g. `Women Classic`.
    #[must_use]
    pub fn query(&self) -> String {
        format!("{} {}", self.recipient.label(), self.style.label())
    }

    /// Keep products within budget, capped at [`MAX_SUGGESTIONS`].
    ///
    /// Returns the total number of matches along with the shortlist.
    #[must_use]
    pub fn shortlist(&self, products: Vec<Product>) -> (usize, Vec<Product>) {
        let matching: Vec<Product> = products
            .into_iter()
            .filter(|p| self.budget.contains(p.price))
            .collect();
        let total = matching.len();
        (total, matching.into_iter().take(MAX_SUGGESTIONS).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;

    fn quiz(budget: Budget) -> GiftQuiz {
        GiftQuiz {
            recipient: Recipient::Women,
            style: Style::Classic,
            budget,
            size: Some("M".to_owned()),
        }
    }

    #[test]
    fn test_query() {
        assert_eq!(quiz(Budget::Under5k).query(), "Women Classic");
    }

    #[test]
    fn test_budget_bounds_are_inclusive() {
        assert!(Budget::Under5k.contains(Price::from_rupees(5_000)));
        assert!(Budget::From5kTo10k.contains(Price::from_rupees(5_000)));
        assert!(!Budget::From5kTo10k.contains(Price::from_rupees(10_001)));
        assert!(Budget::Over20k.contains(Price::from_rupees(1_000_000)));
        assert!(!Budget::Over20k.contains(Price::from_rupees(19_999)));
    }

    #[test]
    fn test_shortlist_caps_results() {
        let products: Vec<Product> = (0..10)
            .map(|i| product(&i.to_string(), &["women"], 6_000 + i))
            .chain(std::iter::once(product("cheap", &["women"], 100)))
            .collect();
        let (total, shortlist) = quiz(Budget::From5kTo10k).shortlist(products);
        assert_eq!(total, 10);
        assert_eq!(shortlist.len(), MAX_SUGGESTIONS);
        assert!(shortlist.iter().all(|p| p.id.as_str() != "cheap"));
    }

    #[test]
    fn test_deserialize_answers() {
        let quiz: GiftQuiz = serde_json::from_str(
            r#"{"recipient": "kids", "style": "bold", "budget": "from10k_to20k"}"#,
        )
        .unwrap();
        assert_eq!(quiz.recipient, Recipient::Kids);
        assert_eq!(quiz.budget, Budget::From10kTo20k);
        assert!(quiz.size.is_none());
    }
}
