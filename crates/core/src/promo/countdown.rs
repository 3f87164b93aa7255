//! Countdown to Christmas.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone};

/// Sri Lanka Standard Time, UTC+05:30.
const SRI_LANKA_OFFSET_SECS: i32 = 5 * 3600 + 30 * 60;

/// Time left until Christmas morning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Countdown {
    /// Time from `now` until the next 25 December 00:00, in Sri Lanka time.
    ///
    /// From Christmas morning onwards the target is the following year's.
    #[must_use]
    pub fn until_christmas<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let Some(offset) = FixedOffset::east_opt(SRI_LANKA_OFFSET_SECS) else {
            return Self::default();
        };
        let local = now.with_timezone(&offset);
        let christmas = |year: i32| {
            NaiveDate::from_ymd_opt(year, 12, 25)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .and_then(|t| t.and_local_timezone(offset).single())
        };

        let remaining = match christmas(local.year()) {
            Some(target) if target > local => (target - local).num_seconds(),
            _ => match christmas(local.year() + 1) {
                Some(target) => (target - local).num_seconds(),
                None => return Self::default(),
            },
        };

        Self {
            days: remaining / 86_400,
            hours: (remaining % 86_400) / 3600,
            minutes: (remaining % 3600) / 60,
            seconds: remaining % 60,
        }
    }

    /// Total seconds left, for the client-side ticker.
    #[must_use]
    pub const fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3600 + self.minutes * 60 + self.seconds
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_one_day_before() {
        // 2025-12-24 00:00 in Colombo is 2025-12-23 18:30 UTC.
        let now = Utc.with_ymd_and_hms(2025, 12, 23, 18, 30, 0).unwrap();
        let countdown = Countdown::until_christmas(&now);
        assert_eq!(
            countdown,
            Countdown {
                days: 1,
                hours: 0,
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_breaks_down_units() {
        let now = Utc.with_ymd_and_hms(2025, 12, 20, 7, 59, 30).unwrap();
        let countdown = Countdown::until_christmas(&now);
        assert_eq!(countdown.days, 4);
        assert_eq!(countdown.hours, 10);
        assert_eq!(countdown.minutes, 30);
        assert_eq!(countdown.seconds, 30);
        assert_eq!(countdown.total_seconds(), 4 * 86_400 + 10 * 3600 + 30 * 60 + 30);
    }

    #[test]
    fn test_rolls_over_after_christmas() {
        // 2025-12-26 17:30 in Colombo.
        let now = Utc.with_ymd_and_hms(2025, 12, 26, 12, 0, 0).unwrap();
        let countdown = Countdown::until_christmas(&now);
        assert_eq!(countdown.days, 363);
        assert_eq!(countdown.hours, 6);
        assert_eq!(countdown.minutes, 30);
    }

    #[test]
    fn test_christmas_morning_targets_next_year() {
        // 2025-12-25 00:00 in Colombo.
        let now = Utc.with_ymd_and_hms(2025, 12, 24, 18, 30, 0).unwrap();
        let countdown = Countdown::until_christmas(&now);
        assert_eq!(countdown.days, 365);
        assert_eq!(countdown.total_seconds(), 365 * 86_400);
    }

    #[test]
    fn test_counts_towards_this_years_christmas() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let countdown = Countdown::until_christmas(&now);
        assert!(countdown.days > 350);
    }
}
