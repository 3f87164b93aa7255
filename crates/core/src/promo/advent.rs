//! Advent calendar.
//!
//! One door per day of the month, 1 through 24. A visitor may open one door
//! per day, never a door from the future, and never the same door twice.
//! Opening a door on consecutive days grows a streak.

use serde::{Deserialize, Serialize};

/// Number of doors.
pub const ADVENT_DAYS: u32 = 24;

/// The reward behind a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdventReward {
    pub day: u32,
    pub reward: &'static str,
    pub description: &'static str,
}

const fn door(day: u32, reward: &'static str, description: &'static str) -> AdventReward {
    AdventReward {
        day,
        reward,
        description,
    }
}

/// All 24 doors, in order.
pub const ADVENT_REWARDS: [AdventReward; 24] = [
    door(1, "5% OFF", "Welcome to Christmas!"),
    door(2, "10% OFF", "Double the cheer!"),
    door(3, "Free Shipping", "On orders over Rs. 5,000"),
    door(4, "15% OFF", "Halfway there!"),
    door(5, "Mystery Gift", "Surprise reward!"),
    door(6, "20% OFF", "Getting better!"),
    door(7, "Rs. 1,000 Credit", "Use anytime!"),
    door(8, "25% OFF", "Over a week in!"),
    door(9, "Free Gift Wrap", "For any order"),
    door(10, "30% OFF", "Mega savings!"),
    door(11, "Double Points", "On all purchases"),
    door(12, "35% OFF", "Almost halfway!"),
    door(13, "Rs. 2,500 Credit", "Use on anything!"),
    door(14, "40% OFF", "Record discount!"),
    door(15, "VIP Access", "Exclusive sales"),
    door(16, "45% OFF", "Incredible deal!"),
    door(17, "Free Express Ship", "Next day delivery"),
    door(18, "50% OFF", "HALF OFF!"),
    door(19, "Rs. 5,000 Credit", "Use on Christmas"),
    door(20, "Buy 1 Get 1", "50% off second"),
    door(21, "55% OFF", "Maximum discount!"),
    door(22, "Exclusive Item", "Limited edition"),
    door(23, "60% OFF", "ULTIMATE DEAL!"),
    door(24, "🎄 MYSTERY", "Something special!"),
];

/// Reward behind `day`, if it is a valid door.
#[must_use]
pub fn reward_for(day: u32) -> Option<&'static AdventReward> {
    ADVENT_REWARDS.iter().find(|r| r.day == day)
}

/// Why a door could not be opened.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdventError {
    #[error("You already claimed today's reward. Come back tomorrow!")]
    AlreadyClaimedToday,
    #[error("This day is not available yet!")]
    NotYetAvailable,
    #[error("This door is already open")]
    AlreadyOpened,
    #[error("There is no door {0}")]
    NoSuchDoor(u32),
}

/// A visitor's calendar progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdventCalendar {
    pub streak: u32,
    pub last_claimed_day: Option<u32>,
    pub claimed_days: Vec<u32>,
}

/// Display state of one door.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoorState {
    Opened,
    Today,
    Available,
    Locked,
}

impl AdventCalendar {
    /// Whether a door was already opened on `today`.
    #[must_use]
    pub fn claimed_today(&self, today: u32) -> bool {
        self.last_claimed_day == Some(today)
    }

    #[must_use]
    pub fn is_opened(&self, day: u32) -> bool {
        self.claimed_days.contains(&day)
    }

    /// How door `day` should be drawn on `today`.
    #[must_use]
    pub fn door_state(&self, day: u32, today: u32) -> DoorState {
        if self.is_opened(day) {
            DoorState::Opened
        } else if day == today {
            DoorState::Today
        } else if day < today {
            DoorState::Available
        } else {
            DoorState::Locked
        }
    }

    /// Open door `day` on day-of-month `today`.
    ///
    /// The streak grows when the previous claim was yesterday (or on the
    /// 24th, when today is the 1st) and restarts at one otherwise.
    ///
    /// # Errors
    ///
    /// Fails when a door was already opened today, `day` is in the future,
    /// the door was opened before, or `day` is not a door.
    pub fn claim(&mut self, day: u32, today: u32) -> Result<&'static AdventReward, AdventError> {
        let reward = reward_for(day).ok_or(AdventError::NoSuchDoor(day))?;
        if self.claimed_today(today) {
            return Err(AdventError::AlreadyClaimedToday);
        }
        if day > today {
            return Err(AdventError::NotYetAvailable);
        }
        if self.is_opened(day) {
            return Err(AdventError::AlreadyOpened);
        }

        let consecutive = self.last_claimed_day == Some(today.wrapping_sub(1))
            || (today == 1 && self.last_claimed_day == Some(ADVENT_DAYS));
        self.streak = if consecutive { self.streak + 1 } else { 1 };
        self.last_claimed_day = Some(today);
        self.claimed_days.push(day);

        Ok(reward)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rewards_cover_every_day() {
        for day in 1..=ADVENT_DAYS {
            assert_eq!(reward_for(day).unwrap().day, day);
        }
        assert!(reward_for(25).is_none());
        assert_eq!(ADVENT_REWARDS[23].reward, "🎄 MYSTERY");
    }

    #[test]
    fn test_claim_once_per_day() {
        let mut calendar = AdventCalendar::default();
        let reward = calendar.claim(5, 5).unwrap();
        assert_eq!(reward.reward, "Mystery Gift");
        assert_eq!(calendar.streak, 1);
        assert_eq!(calendar.claim(4, 5), Err(AdventError::AlreadyClaimedToday));
    }

    #[test]
    fn test_future_door_is_locked() {
        let mut calendar = AdventCalendar::default();
        assert_eq!(calendar.claim(10, 3), Err(AdventError::NotYetAvailable));
        assert!(calendar.claimed_days.is_empty());
    }

    #[test]
    fn test_door_opens_once() {
        let mut calendar = AdventCalendar::default();
        calendar.claim(2, 2).unwrap();
        assert_eq!(calendar.claim(2, 3), Err(AdventError::AlreadyOpened));
    }

    #[test]
    fn test_streak_grows_on_consecutive_days() {
        let mut calendar = AdventCalendar::default();
        calendar.claim(1, 1).unwrap();
        calendar.claim(2, 2).unwrap();
        calendar.claim(3, 3).unwrap();
        assert_eq!(calendar.streak, 3);

        calendar.claim(6, 6).unwrap();
        assert_eq!(calendar.streak, 1);
    }

    #[test]
    fn test_streak_wraps_from_24_to_1() {
        let mut calendar = AdventCalendar {
            streak: 4,
            last_claimed_day: Some(24),
            claimed_days: vec![24],
        };
        calendar.claim(1, 1).unwrap();
        assert_eq!(calendar.streak, 5);
    }

    #[test]
    fn test_no_such_door() {
        let mut calendar = AdventCalendar::default();
        assert_eq!(calendar.claim(0, 10), Err(AdventError::NoSuchDoor(0)));
        assert_eq!(calendar.claim(31, 31), Err(AdventError::NoSuchDoor(31)));
    }

    #[test]
    fn test_door_state() {
        let mut calendar = AdventCalendar::default();
        calendar.claim(1, 3).unwrap();
        assert_eq!(calendar.door_state(1, 3), DoorState::Opened);
        assert_eq!(calendar.door_state(2, 3), DoorState::Available);
        assert_eq!(calendar.door_state(3, 3), DoorState::Today);
        assert_eq!(calendar.door_state(4, 3), DoorState::Locked);
    }
}
