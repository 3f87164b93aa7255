//! Limited-spots contest.

use serde::{Deserialize, Serialize};

/// Spots in a contest when the backend does not say.
pub const DEFAULT_SPOTS_TOTAL: u32 = 100;

const fn default_total() -> u32 {
    DEFAULT_SPOTS_TOTAL
}

/// `GET /api/christmas-features/contest/spots` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestSpots {
    #[serde(default)]
    pub spots_remaining: u32,
    #[serde(default = "default_total")]
    pub spots_total: u32,
}

impl Default for ContestSpots {
    fn default() -> Self {
        Self {
            spots_remaining: 0,
            spots_total: DEFAULT_SPOTS_TOTAL,
        }
    }
}

impl ContestSpots {
    /// Spots already taken.
    #[must_use]
    pub const fn filled(&self) -> u32 {
        self.spots_total.saturating_sub(self.spots_remaining)
    }

    /// Remaining spots as a whole percentage of the total (0..=100).
    #[must_use]
    pub fn remaining_percent(&self) -> u32 {
        if self.spots_total == 0 {
            return 0;
        }
        (self.spots_remaining.min(self.spots_total) * 100) / self.spots_total
    }

    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.spots_remaining == 0
    }
}

/// `POST /api/christmas-features/contest/enter` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestEntry {
    #[serde(default)]
    pub is_winner: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub discount: Option<u8>,
    #[serde(default)]
    pub spots_remaining: u32,
}

impl ContestEntry {
    /// Toast shown after entering.
    #[must_use]
    pub fn message(&self) -> String {
        if self.is_winner {
            "🎉 You won a discount code!".to_owned()
        } else {
            format!("Entry submitted! {} spots left!", self.spots_remaining)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_spots_defaults() {
        let spots: ContestSpots = serde_json::from_str("{}").unwrap();
        assert_eq!(spots, ContestSpots::default());
        assert!(spots.is_full());
        assert_eq!(spots.filled(), 100);
    }

    #[test]
    fn test_percentages() {
        let spots = ContestSpots {
            spots_remaining: 37,
            spots_total: 100,
        };
        assert_eq!(spots.remaining_percent(), 37);
        assert_eq!(spots.filled(), 63);

        let empty = ContestSpots {
            spots_remaining: 5,
            spots_total: 0,
        };
        assert_eq!(empty.remaining_percent(), 0);
        assert_eq!(empty.filled(), 0);
    }

    #[test]
    fn test_entry_message() {
        let entry: ContestEntry =
            serde_json::from_str(r#"{"isWinner": false, "spotsRemaining": 12}"#).unwrap();
        assert_eq!(entry.message(), "Entry submitted! 12 spots left!");

        let winner: ContestEntry = serde_json::from_str(
            r#"{"isWinner": true, "code": "WIN15", "discount": 15, "spotsRemaining": 11}"#,
        )
        .unwrap();
        assert_eq!(winner.message(), "🎉 You won a discount code!");
        assert_eq!(winner.code.as_deref(), Some("WIN15"));
    }
}
