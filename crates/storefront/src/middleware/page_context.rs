//! Per-page header and overlay data.
//!
//! Every rendered page shows the cart and wishlist badges, login state,
//! pending toasts, the holiday banner, and at most one promo overlay.
//! [`PageContext`] gathers all of it in one extractor.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use rand::Rng;
use tower_sessions::Session;

use nikola_core::cart::Cart;
use nikola_core::promo::{Countdown, HolidayStatus, POPUP_MESSAGES, PopupMessage, PopupTracker};
use nikola_core::wishlist::Wishlist;

use crate::error::AppError;
use crate::models::{CurrentCustomer, Toast, load, session_keys, store, take_toasts};
use crate::state::AppState;

/// Data shared by every page template.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub customer: Option<CurrentCustomer>,
    pub cart_count: u32,
    pub wishlist_count: usize,
    pub toasts: Vec<Toast>,
    pub holiday: HolidayStatus,
    pub countdown: Countdown,
    pub popup: Option<&'static PopupMessage>,
    pub show_gift: bool,
    pub admin_url: String,
}

impl PageContext {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.customer.is_some()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.customer.as_ref().is_some_and(CurrentCustomer::is_admin)
    }

    /// Holiday discount in percent, zero outside holiday mode.
    #[must_use]
    pub const fn discount(&self) -> u8 {
        self.holiday.active_discount()
    }

    #[must_use]
    pub fn customer_email(&self) -> &str {
        self.customer.as_ref().map_or("", |c| c.email.as_str())
    }
}

impl FromRequestParts<AppState> for PageContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let customer = session
            .get::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
            .await?;
        let cart: Cart = load(&session, session_keys::CART).await?;
        let wishlist: Wishlist = load(&session, session_keys::WISHLIST).await?;
        let toasts = take_toasts(&session).await?;
        let holiday = state.backend().holiday_status().await;

        let (popup, show_gift) = if holiday.enabled {
            let mut tracker: PopupTracker = load(&session, session_keys::POPUP).await?;
            let popup = tracker
                .on_page_view(Utc::now().timestamp())
                .then(random_popup)
                .flatten();
            let show_gift = tracker.take_gift();
            store(&session, session_keys::POPUP, &tracker).await?;
            (popup, show_gift)
        } else {
            (None, false)
        };

        Ok(Self {
            customer,
            cart_count: cart.count(),
            wishlist_count: wishlist.len(),
            toasts,
            holiday,
            countdown: Countdown::until_christmas(&Utc::now()),
            popup,
            show_gift,
            admin_url: state.config().admin_url.clone(),
        })
    }
}

fn random_popup() -> Option<&'static PopupMessage> {
    let index = rand::rng().random_range(0..POPUP_MESSAGES.len());
    POPUP_MESSAGES.get(index)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_random_popup_is_one_of_the_messages() {
        for _ in 0..20 {
            let popup = random_popup().unwrap();
            assert!(POPUP_MESSAGES.iter().any(|m| m.code == popup.code));
        }
    }
}
