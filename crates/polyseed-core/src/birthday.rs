//! Coarse seed birthday.
//!
//! The birthday counts whole steps of one twelfth of a Gregorian year
//! since 2021-11-01 12:00:00 UTC and wraps after 1024 steps (about 85
//! years). Wallets use it only as a lower bound for chain scanning.

use polyseed_types::BIRTHDAY_MASK;

/// Unix time of birthday zero.
pub const EPOCH: u64 = 1_635_768_000;

/// Length of one birthday step in seconds.
pub const TIME_STEP: u64 = 2_629_746;

/// Converts a unix time to the 10-bit birthday. Times before the epoch
/// map to zero.
pub fn encode(unix_time: u64) -> u16 {
    let steps = unix_time.saturating_sub(EPOCH) / TIME_STEP;
    // Truncation is intended: the field wraps.
    (steps & u64::from(BIRTHDAY_MASK)) as u16
}

/// Converts a 10-bit birthday back to the unix time of its step.
pub fn decode(birthday: u16) -> u64 {
    EPOCH + u64::from(birthday & BIRTHDAY_MASK) * TIME_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_zero() {
        assert_eq!(encode(EPOCH), 0);
        assert_eq!(decode(0), EPOCH);
    }

    #[test]
    fn before_epoch_clamps() {
        assert_eq!(encode(0), 0);
        assert_eq!(encode(EPOCH - 1), 0);
    }

    #[test]
    fn new_year_2023() {
        // 2023-01-01 00:00:00 UTC
        assert_eq!(encode(1_672_531_200), 13);
        assert_eq!(decode(13), 1_669_954_698);
    }

    #[test]
    fn decode_never_exceeds_input() {
        for t in [EPOCH, EPOCH + 1, 1_700_000_000, 1_800_000_000] {
            let b = encode(t);
            assert!(decode(b) <= t);
            assert!(t - decode(b) < TIME_STEP);
        }
    }

    #[test]
    fn wraps_after_field_width() {
        let wrap = EPOCH + TIME_STEP * (u64::from(BIRTHDAY_MASK) + 1);
        assert_eq!(encode(wrap), 0);
        assert_eq!(encode(wrap - 1), BIRTHDAY_MASK);
    }
}
