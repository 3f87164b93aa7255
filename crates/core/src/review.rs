//! Product reviews and site testimonials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Email, ReviewId};

/// Reviews per page on the product page.
pub const DEFAULT_REVIEW_LIMIT: u32 = 5;

/// Name shown for reviews submitted without one.
pub const ANONYMOUS: &str = "Anonymous";

/// Review form validation failures, in the order they are checked.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Please select a rating")]
    MissingRating,
    #[error("Email is required")]
    MissingEmail,
    #[error("Review comment is required")]
    MissingComment,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Only verified buyers can leave reviews")]
    NotVerifiedBuyer,
    #[error("Reply cannot be empty")]
    EmptyReply,
}

/// An admin reply under a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub verified_purchase: bool,
    #[serde(default)]
    pub replies: Vec<Reply>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Review {
    /// Display name, `Anonymous` when blank.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            ANONYMOUS
        } else {
            &self.name
        }
    }

    /// `★★★☆☆` style rendering.
    #[must_use]
    pub fn stars(&self) -> String {
        stars(self.rating)
    }
}

/// Render a 0..=5 rating as filled and empty stars.
#[must_use]
pub fn stars(rating: u8) -> String {
    let filled = usize::from(rating.min(5));
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

/// Review list ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewSort {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
}

impl ReviewSort {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Highest => "highest",
            Self::Lowest => "lowest",
        }
    }
}

/// Review list query (`GET /api/products/{id}/reviews`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewQuery {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub sort: ReviewSort,
    /// Only reviews with exactly this many stars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

const fn first_page() -> u32 {
    1
}

const fn default_limit() -> u32 {
    DEFAULT_REVIEW_LIMIT
}

impl Default for ReviewQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_REVIEW_LIMIT,
            sort: ReviewSort::default(),
            rating: None,
        }
    }
}

impl ReviewQuery {
    /// Clamp out-of-range values: page at least 1, limit 1..=50, rating 1..=5.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 50),
            sort: self.sort,
            rating: self.rating.filter(|r| (1..=5).contains(r)),
        }
    }

    /// Query-string pairs for the backend.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
            ("sort", self.sort.as_str().to_owned()),
        ];
        if let Some(rating) = self.rating {
            pairs.push(("rating", rating.to_string()));
        }
        pairs
    }
}

/// Star counts, keyed by rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBreakdown {
    #[serde(rename = "1", default)]
    pub one: u32,
    #[serde(rename = "2", default)]
    pub two: u32,
    #[serde(rename = "3", default)]
    pub three: u32,
    #[serde(rename = "4", default)]
    pub four: u32,
    #[serde(rename = "5", default)]
    pub five: u32,
}

impl RatingBreakdown {
    /// Count for `rating` stars.
    #[must_use]
    pub const fn count(&self, rating: u8) -> u32 {
        match rating {
            1 => self.one,
            2 => self.two,
            3 => self.three,
            4 => self.four,
            5 => self.five,
            _ => 0,
        }
    }

    #[must_use]
    pub const fn total(&self) -> u32 {
        self.one + self.two + self.three + self.four + self.five
    }

    /// Average star rating, `0.0` without any ratings.
    #[must_use]
    pub fn average(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted: u32 = (1..=5).map(|r| u32::from(r) * self.count(r)).sum();
        f64::from(weighted) / f64::from(total)
    }

    /// Whole-number share of `rating` in percent.
    #[must_use]
    pub fn percent(&self, rating: u8) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (self.count(rating) * 100 + total / 2) / total
    }
}

/// One page of reviews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewPage {
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub total: u32,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub pages: u32,
    #[serde(default)]
    pub breakdown: RatingBreakdown,
}

impl Default for ReviewPage {
    fn default() -> Self {
        Self {
            reviews: Vec::new(),
            total: 0,
            page: 1,
            pages: 1,
            breakdown: RatingBreakdown::default(),
        }
    }
}

impl ReviewPage {
    #[must_use]
    pub fn average(&self) -> f64 {
        self.breakdown.average()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.pages
    }
}

/// A review submitted from the product page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Validated review body for the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReview {
    pub name: String,
    pub rating: u8,
    pub comment: String,
    pub email: Email,
}

impl ReviewForm {
    /// Validate a new review.
    ///
    /// `has_purchased` is whether the visitor's orders contain the product.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate(self, has_purchased: bool) -> Result<NewReview, ReviewError> {
        if self.rating < 1 {
            return Err(ReviewError::MissingRating);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ReviewError::MissingEmail);
        }
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::MissingComment);
        }
        let email = Email::parse(email).map_err(|_| ReviewError::InvalidEmail)?;
        if !has_purchased {
            return Err(ReviewError::NotVerifiedBuyer);
        }

        let name = self.name.trim();
        Ok(NewReview {
            name: if name.is_empty() { ANONYMOUS } else { name }.to_owned(),
            rating: self.rating.min(5),
            comment: comment.to_owned(),
            email,
        })
    }

    /// Validate an edit of an existing review (rating and comment only).
    ///
    /// # Errors
    ///
    /// Returns the first failing rule.
    pub fn validate_edit(self) -> Result<ReviewEdit, ReviewError> {
        if self.rating < 1 {
            return Err(ReviewError::MissingRating);
        }
        let comment = self.comment.trim();
        if comment.is_empty() {
            return Err(ReviewError::MissingComment);
        }
        Ok(ReviewEdit {
            email: self.email.trim().to_owned(),
            name: self.name.trim().to_owned(),
            rating: self.rating.min(5),
            comment: comment.to_owned(),
        })
    }
}

/// Edit body (`PUT /api/products/{id}/reviews/{review}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewEdit {
    pub email: String,
    pub name: String,
    pub rating: u8,
    pub comment: String,
}

/// Validate an admin reply.
///
/// # Errors
///
/// Returns [`ReviewError::EmptyReply`] for a blank reply.
pub fn validate_reply(comment: &str) -> Result<String, ReviewError> {
    let comment = comment.trim();
    if comment.is_empty() {
        Err(ReviewError::EmptyReply)
    } else {
        Ok(comment.to_owned())
    }
}

/// Site-wide testimonial form failures.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestimonialError {
    #[error("Please add your name and review")]
    MissingFields,
}

/// A testimonial on the `/reviews` page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub id: u64,
    pub name: String,
    pub rating: u8,
    pub text: String,
}

/// The testimonials every visitor starts with.
#[must_use]
pub fn seed_testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            id: 1,
            name: "Amara".to_owned(),
            rating: 5,
            text: "Absolutely love the quality! The craftsmanship reminds me of traditional Sri Lankan tailoring with a modern twist. Highly recommended to everyone in Colombo and beyond.".to_owned(),
        },
        Testimonial {
            id: 2,
            name: "Ravi".to_owned(),
            rating: 4,
            text: "Beautiful designs and fast delivery across Colombo. The fabric quality exceeded my expectations. Would appreciate more local payment options.".to_owned(),
        },
        Testimonial {
            id: 3,
            name: "Priya".to_owned(),
            rating: 5,
            text: "Finally found a brand that understands Sri Lankan style! The pieces are perfect for both formal and casual wear. Great service from the team!".to_owned(),
        },
    ]
}

/// Prepend a new testimonial to `list`.
///
/// # Errors
///
/// Returns [`TestimonialError::MissingFields`] when name or text is blank.
pub fn add_testimonial(
    list: &mut Vec<Testimonial>,
    name: &str,
    rating: u8,
    text: &str,
) -> Result<(), TestimonialError> {
    let (name, text) = (name.trim(), text.trim());
    if name.is_empty() || text.is_empty() {
        return Err(TestimonialError::MissingFields);
    }
    let id = list.iter().map(|t| t.id).max().unwrap_or(0) + 1;
    list.insert(
        0,
        Testimonial {
            id,
            name: name.to_owned(),
            rating: rating.clamp(1, 5),
            text: text.to_owned(),
        },
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form() -> ReviewForm {
        ReviewForm {
            name: String::new(),
            email: "buyer@example.com".to_owned(),
            rating: 4,
            comment: "Warm and soft".to_owned(),
        }
    }

    #[test]
    fn test_validate_defaults_name() {
        let review = form().validate(true).unwrap();
        assert_eq!(review.name, ANONYMOUS);
        assert_eq!(review.rating, 4);
    }

    #[test]
    fn test_validate_order_of_checks() {
        let mut f = form();
        f.rating = 0;
        f.email = String::new();
        assert_eq!(f.validate(true), Err(ReviewError::MissingRating));

        let mut f = form();
        f.email = " ".to_owned();
        f.comment = String::new();
        assert_eq!(f.validate(true), Err(ReviewError::MissingEmail));

        let mut f = form();
        f.comment = String::new();
        f.email = "bad".to_owned();
        assert_eq!(f.validate(true), Err(ReviewError::MissingComment));

        let mut f = form();
        f.email = "buyer@localhost".to_owned();
        assert_eq!(f.validate(false), Err(ReviewError::InvalidEmail));

        assert_eq!(form().validate(false), Err(ReviewError::NotVerifiedBuyer));
    }

    #[test]
    fn test_validate_edit() {
        let mut f = form();
        f.email = String::new();
        assert!(f.validate_edit().is_ok());

        let mut f = form();
        f.comment = "  ".to_owned();
        assert_eq!(f.validate_edit(), Err(ReviewError::MissingComment));
    }

    #[test]
    fn test_reply() {
        assert_eq!(validate_reply("  "), Err(ReviewError::EmptyReply));
        assert_eq!(validate_reply(" Thanks! ").unwrap(), "Thanks!");
    }

    #[test]
    fn test_breakdown() {
        let page: ReviewPage = serde_json::from_str(
            r#"{"reviews": [], "total": 4, "page": 1, "pages": 1,
                "breakdown": {"1": 0, "2": 0, "3": 1, "4": 1, "5": 2}}"#,
        )
        .unwrap();
        assert!((page.average() - 4.25).abs() < f64::EPSILON);
        assert_eq!(page.breakdown.percent(5), 50);
        assert_eq!(page.breakdown.percent(1), 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_empty_breakdown() {
        let breakdown = RatingBreakdown::default();
        assert!(breakdown.average().abs() < f64::EPSILON);
        assert_eq!(breakdown.percent(3), 0);
    }

    #[test]
    fn test_query_pairs() {
        let query = ReviewQuery {
            page: 0,
            limit: 500,
            sort: ReviewSort::Highest,
            rating: Some(9),
        }
        .normalized();
        assert_eq!(
            query.to_pairs(),
            vec![
                ("page", "1".to_owned()),
                ("limit", "50".to_owned()),
                ("sort", "highest".to_owned()),
            ]
        );

        let query = ReviewQuery {
            rating: Some(5),
            ..ReviewQuery::default()
        };
        assert_eq!(query.to_pairs().last().unwrap(), &("rating", "5".to_owned()));
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars(3), "★★★☆☆");
        assert_eq!(stars(9), "★★★★★");
    }

    #[test]
    fn test_add_testimonial_prepends() {
        let mut list = seed_testimonials();
        add_testimonial(&mut list, "Kasun", 5, "Superb").unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].name, "Kasun");
        assert_eq!(list[0].id, 4);

        assert_eq!(
            add_testimonial(&mut list, "", 5, "x"),
            Err(TestimonialError::MissingFields)
        );
    }
}
