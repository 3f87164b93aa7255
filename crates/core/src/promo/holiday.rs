//! Holiday mode.

use serde::{Deserialize, Serialize};

/// Discount assumed when the backend has never been reachable.
pub const FALLBACK_DISCOUNT: u8 = 25;

/// Seconds between holiday status refreshes.
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// `GET /api/holiday/status` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayStatus {
    pub enabled: bool,
    #[serde(default)]
    pub discount: u8,
}

impl HolidayStatus {
    /// Status used when the backend is unreachable and nothing is cached.
    pub const FALLBACK: Self = Self {
        enabled: true,
        discount: FALLBACK_DISCOUNT,
    };

    /// Off, no discount.
    pub const DISABLED: Self = Self {
        enabled: false,
        discount: 0,
    };

    /// Discount in effect: zero unless holiday mode is on.
    #[must_use]
    pub const fn active_discount(&self) -> u8 {
        if self.enabled { self.discount } else { 0 }
    }

    /// Resolve a fetch result against the last known status.
    #[must_use]
    pub fn resolve<E>(fetched: Result<Self, E>, last_known: Option<Self>) -> Self {
        fetched.unwrap_or_else(|_| last_known.unwrap_or(Self::FALLBACK))
    }
}

/// Admin change to holiday mode (`POST /api/holiday/toggle`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayUpdate {
    pub enabled: bool,
    pub discount: u8,
}

/// Holiday settings failures.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HolidayError {
    #[error("Discount must be between 0 and 100")]
    DiscountOutOfRange,
}

impl HolidayUpdate {
    /// Build an update from raw form input.
    ///
    /// # Errors
    ///
    /// Returns [`HolidayError::DiscountOutOfRange`] unless `discount` is 0..=100.
    pub fn new(enabled: bool, discount: i64) -> Result<Self, HolidayError> {
        let discount = u8::try_from(discount)
            .ok()
            .filter(|d| *d <= 100)
            .ok_or(HolidayError::DiscountOutOfRange)?;
        Ok(Self { enabled, discount })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_fresh_status() {
        let fresh = HolidayStatus {
            enabled: false,
            discount: 10,
        };
        let resolved = HolidayStatus::resolve::<()>(Ok(fresh), Some(HolidayStatus::FALLBACK));
        assert_eq!(resolved, fresh);
    }

    #[test]
    fn test_resolve_falls_back_to_cache_then_default() {
        let cached = HolidayStatus {
            enabled: true,
            discount: 40,
        };
        assert_eq!(HolidayStatus::resolve(Err(()), Some(cached)), cached);
        assert_eq!(HolidayStatus::resolve(Err(()), None), HolidayStatus::FALLBACK);
        assert_eq!(HolidayStatus::FALLBACK.discount, 25);
    }

    #[test]
    fn test_active_discount() {
        let off = HolidayStatus {
            enabled: false,
            discount: 30,
        };
        assert_eq!(off.active_discount(), 0);
        assert_eq!(HolidayStatus::FALLBACK.active_discount(), 25);
    }

    #[test]
    fn test_update_range() {
        assert!(HolidayUpdate::new(true, 100).is_ok());
        assert_eq!(
            HolidayUpdate::new(true, 101),
            Err(HolidayError::DiscountOutOfRange)
        );
        assert_eq!(
            HolidayUpdate::new(true, -1),
            Err(HolidayError::DiscountOutOfRange)
        );
    }
}
