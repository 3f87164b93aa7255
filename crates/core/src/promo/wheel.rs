//! Spin the wheel.
//!
//! The backend decides the prize. The storefront only needs to know where
//! to stop the wheel so the pointer lands on the segment that was won.

use serde::{Deserialize, Serialize};

/// One slice of the wheel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelSegment {
    pub label: &'static str,
    pub color: &'static str,
}

/// Wheel slices, clockwise from the pointer.
pub const WHEEL_SEGMENTS: [WheelSegment; 8] = [
    WheelSegment {
        label: "5% OFF",
        color: "#ff6b6b",
    },
    WheelSegment {
        label: "10% OFF",
        color: "#ff8787",
    },
    WheelSegment {
        label: "15% OFF",
        color: "#ffa5a5",
    },
    WheelSegment {
        label: "20% OFF",
        color: "#f06595",
    },
    WheelSegment {
        label: "25% OFF",
        color: "#d6336c",
    },
    WheelSegment {
        label: "FREE SHIP",
        color: "#b197fc",
    },
    WheelSegment {
        label: "₨500 GIFT",
        color: "#7950f2",
    },
    WheelSegment {
        label: "SPIN AGAIN",
        color: "#4c6ef5",
    },
];

/// Fewest full turns before the wheel stops.
pub const MIN_TURNS: u32 = 5;

/// Most full turns before the wheel stops.
pub const MAX_TURNS: u32 = 9;

/// Degrees per slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn segment_angle() -> f64 {
    360.0 / WHEEL_SEGMENTS.len() as f64
}

/// `POST /api/christmas-features/spin-wheel` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub code: String,
    pub prize: String,
}

impl SpinResult {
    /// Index of the slice matching the prize label, ignoring case and spacing.
    #[must_use]
    pub fn segment_index(&self) -> Option<usize> {
        let wanted = normalize(&self.prize);
        WHEEL_SEGMENTS
            .iter()
            .position(|s| normalize(s.label) == wanted)
    }
}

fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '%')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Final CSS rotation in degrees.
///
/// `turns` is clamped to [`MIN_TURNS`]..=[`MAX_TURNS`] and `jitter` (0.0..1.0)
/// picks a spot inside the slice. With a known `segment`, the pointer ends on
/// it; without one, `jitter` spreads over the whole wheel.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn rotation(turns: u32, segment: Option<usize>, jitter: f64) -> f64 {
    let turns = f64::from(turns.clamp(MIN_TURNS, MAX_TURNS));
    let jitter = jitter.clamp(0.0, 0.999);
    let slice = segment_angle();

    let offset = match segment {
        Some(index) if index < WHEEL_SEGMENTS.len() => {
            // The wheel turns clockwise, so slice `index` reaches the pointer
            // after rotating by (len - index) slices.
            let start = (WHEEL_SEGMENTS.len() - index) as f64 * slice;
            (start - slice * jitter).rem_euclid(360.0)
        }
        _ => jitter * 360.0,
    };

    turns * 360.0 + offset
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spin(prize: &str) -> SpinResult {
        SpinResult {
            code: "XMAS-1234".to_owned(),
            prize: prize.to_owned(),
        }
    }

    #[test]
    fn test_segment_index_matches_loosely() {
        assert_eq!(spin("5% OFF").segment_index(), Some(0));
        assert_eq!(spin("free ship").segment_index(), Some(5));
        assert_eq!(spin("₨ 500 gift").segment_index(), Some(6));
        assert_eq!(spin("A pony").segment_index(), None);
    }

    #[test]
    fn test_rotation_turn_bounds() {
        let low = rotation(0, None, 0.0);
        let high = rotation(100, None, 0.0);
        assert!((low - 1800.0).abs() < f64::EPSILON);
        assert!((high - 3240.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotation_lands_inside_segment() {
        let slice = segment_angle();
        for index in 0..WHEEL_SEGMENTS.len() {
            let degrees = rotation(5, Some(index), 0.5).rem_euclid(360.0);
            // Slice `index` starts at index * slice on the unrotated wheel.
            let under_pointer = (360.0 - degrees).rem_euclid(360.0);
            let landed = (under_pointer / slice).floor() as usize % WHEEL_SEGMENTS.len();
            assert_eq!(landed, index);
        }
    }
}
