//! Surprise popups and the welcome gift box.
//!
//! A server-rendered site has no scroll or timer events, so popups are driven
//! by page views instead: the first view of a session, every fifth view, and
//! any view at least two minutes after the previous popup.

use serde::{Deserialize, Serialize};

/// Taps needed to open the gift box.
pub const GIFT_CLICKS_NEEDED: u32 = 20;

/// Show a popup on every n-th page view.
pub const POPUP_EVERY_NTH_VIEW: u32 = 5;

/// Minimum seconds between time-triggered popups.
pub const POPUP_INTERVAL_SECS: i64 = 120;

/// Seconds before a popup hides itself.
pub const POPUP_AUTO_DISMISS_SECS: u32 = 8;

/// A surprise discount popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupMessage {
    pub title: &'static str,
    pub message: &'static str,
    pub code: &'static str,
}

/// Popups to pick from.
pub const POPUP_MESSAGES: [PopupMessage; 4] = [
    PopupMessage {
        title: "🎄 Flash Deal!",
        message: "Get 20% OFF on winter collection",
        code: "FESTIVE20",
    },
    PopupMessage {
        title: "🎁 Free Gift",
        message: "Free shipping on orders over Rs. 5,000",
        code: "SHIPFREE",
    },
    PopupMessage {
        title: "❄️ Limited Time",
        message: "25% OFF - Only 2 hours left!",
        code: "HURRY25",
    },
    PopupMessage {
        title: "🎅 Santa's Pick",
        message: "15% OFF on our bestsellers",
        code: "SANTASPICK",
    },
];

/// Per-session popup bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupTracker {
    welcome_shown: bool,
    page_views: u32,
    last_shown_at: Option<i64>,
    gift_seen: bool,
}

impl PopupTracker {
    /// Record a page view at unix time `now`; returns whether to show a popup.
    pub fn on_page_view(&mut self, now: i64) -> bool {
        self.page_views = self.page_views.saturating_add(1);

        let show = if self.welcome_shown {
            self.page_views % POPUP_EVERY_NTH_VIEW == 0
                || self
                    .last_shown_at
                    .is_none_or(|at| now - at >= POPUP_INTERVAL_SECS)
        } else {
            self.welcome_shown = true;
            true
        };

        if show {
            self.last_shown_at = Some(now);
        }
        show
    }

    /// Returns `true` exactly once per session: the gift box is offered on
    /// the first page view in holiday mode.
    pub fn take_gift(&mut self) -> bool {
        !std::mem::replace(&mut self.gift_seen, true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_popup_on_first_view() {
        let mut tracker = PopupTracker::default();
        assert!(tracker.on_page_view(1_000));
        assert!(!tracker.on_page_view(1_010));
    }

    #[test]
    fn test_every_fifth_view() {
        let mut tracker = PopupTracker::default();
        let shown: Vec<bool> = (0..10).map(|i| tracker.on_page_view(1_000 + i)).collect();
        assert_eq!(
            shown,
            vec![true, false, false, false, true, false, false, false, false, true]
        );
    }

    #[test]
    fn test_time_trigger() {
        let mut tracker = PopupTracker::default();
        assert!(tracker.on_page_view(0));
        assert!(!tracker.on_page_view(119));
        assert!(tracker.on_page_view(240));
    }

    #[test]
    fn test_gift_offered_once() {
        let mut tracker = PopupTracker::default();
        assert!(tracker.take_gift());
        assert!(!tracker.take_gift());
    }
}
