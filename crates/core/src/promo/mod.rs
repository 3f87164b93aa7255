//! Seasonal promotions.
//!
//! Everything here is switched on by the backend's holiday mode:
//!
//! - [`holiday`] - Holiday mode status and its site-wide discount
//! - [`advent`] - 24-door advent calendar with a daily streak
//! - [`wheel`] - Spin-the-wheel segments and landing angle
//! - [`contest`] - Limited-spots contest counters
//! - [`countdown`] - Time left until Christmas
//! - [`popup`] - Surprise discount popups and the gift box
//! - [`gift_finder`] - Four-question gift quiz

pub mod advent;
pub mod contest;
pub mod countdown;
pub mod gift_finder;
pub mod holiday;
pub mod popup;
pub mod wheel;

pub use advent::{AdventCalendar, AdventError, AdventReward, ADVENT_REWARDS};
pub use contest::{ContestEntry, ContestSpots};
pub use countdown::Countdown;
pub use gift_finder::{Budget, GiftQuiz, Recipient, Style};
pub use holiday::{HolidayError, HolidayStatus, HolidayUpdate};
pub use popup::{GIFT_CLICKS_NEEDED, POPUP_MESSAGES, PopupMessage, PopupTracker};
pub use wheel::{SpinResult, WHEEL_SEGMENTS, WheelSegment};
