//! 12-bit seed checksums.
//!
//! Two checksums are computed over the packed payload
//! (entropy ∥ birthday ∥ features, MSB-first, zero padded to
//! [`PAYLOAD_BYTES`]):
//!
//! - the **state checksum** is stored in memory and in the binary record
//!   and covers only the payload;
//! - the **phrase checksum** is written into the mnemonic and also
//!   covers the language identifier and the coin, which is what lets a
//!   decoder tell languages (and networks) apart.
//!
//! Both take the first 12 bits of `SHA-256(domain ∥ ... ∥ payload)`.
//! A seed whose entropy is encrypted carries the checksum XOR
//! [`ENCRYPTED_MARK`] instead of the plain value.

use polyseed_types::{Coin, CHECKSUM_MASK, PAYLOAD_BYTES};
use sha2::{Digest, Sha256};

/// Domain tag for the state checksum.
const STATE_DOMAIN: &[u8] = b"POLYSEED state";

/// Domain tag for the phrase checksum.
const PHRASE_DOMAIN: &[u8] = b"POLYSEED phrase";

/// XOR mask distinguishing encrypted from plaintext entropy.
///
/// Every bit is set, so a single corrupted checksum bit can never turn
/// one state into the other.
pub const ENCRYPTED_MARK: u16 = CHECKSUM_MASK;

/// Result of comparing a stored checksum against the recomputed one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChecksumState {
    /// The checksum matches the current entropy directly.
    Plaintext,
    /// The checksum matches with the encrypted mark applied.
    Encrypted,
    /// Neither form matches.
    Invalid,
}

impl ChecksumState {
    /// Classifies `stored` against the freshly computed `expected` value.
    pub fn classify(stored: u16, expected: u16) -> Self {
        match stored ^ expected {
            0 => Self::Plaintext,
            ENCRYPTED_MARK => Self::Encrypted,
            _ => Self::Invalid,
        }
    }

    /// Returns the mark to XOR onto a plain checksum for this state.
    ///
    /// `Invalid` has no mark and yields `None`.
    pub fn mark(self) -> Option<u16> {
        match self {
            Self::Plaintext => Some(0),
            Self::Encrypted => Some(ENCRYPTED_MARK),
            Self::Invalid => None,
        }
    }
}

fn truncate(digest: &[u8]) -> u16 {
    ((u16::from(digest[0]) << 4) | (u16::from(digest[1]) >> 4)) & CHECKSUM_MASK
}

/// Computes the language-independent state checksum.
pub fn state_checksum(payload: &[u8; PAYLOAD_BYTES]) -> u16 {
    let mut hasher = Sha256::new();
    hasher.update(STATE_DOMAIN);
    hasher.update(payload);
    truncate(&hasher.finalize())
}

/// Computes the checksum embedded in a phrase for `language_id` and `coin`.
pub fn phrase_checksum(payload: &[u8; PAYLOAD_BYTES], language_id: u8, coin: Coin) -> u16 {
    let mut hasher = Sha256::new();
    hasher.update(PHRASE_DOMAIN);
    hasher.update([language_id]);
    hasher.update(coin.id().to_le_bytes());
    hasher.update(payload);
    truncate(&hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    /// Payload of the all-zero entropy seed with birthday 13, no features.
    fn golden_payload() -> [u8; PAYLOAD_BYTES] {
        let mut payload = [0u8; PAYLOAD_BYTES];
        payload[19] = 0x0d;
        payload
    }

    #[test]
    fn state_checksum_known_value() {
        assert_eq!(state_checksum(&golden_payload()), 0x187);
    }

    #[test]
    fn phrase_checksum_known_values() {
        let payload = golden_payload();
        assert_eq!(phrase_checksum(&payload, 0, Coin::MONERO), 0x6a0);
        assert_eq!(phrase_checksum(&payload, 0, Coin::AEON), 0xa44);
        assert_eq!(phrase_checksum(&payload, 3, Coin::MONERO), 0x3f4);
    }

    #[test]
    fn checksum_fits_in_twelve_bits() {
        for byte in 0..=255u8 {
            let payload = [byte; PAYLOAD_BYTES];
            assert!(state_checksum(&payload) <= CHECKSUM_MASK);
            let coin = Coin::new(u16::from(byte));
            assert!(phrase_checksum(&payload, byte % 10, coin) <= CHECKSUM_MASK);
        }
    }

    #[test]
    fn language_and_coin_change_checksum() {
        let payload = golden_payload();
        let base = phrase_checksum(&payload, 0, Coin::MONERO);
        assert_ne!(base, phrase_checksum(&payload, 1, Coin::MONERO));
        assert_ne!(base, phrase_checksum(&payload, 0, Coin::AEON));
        assert_ne!(base, state_checksum(&payload));
    }

    #[test]
    fn classify_states() {
        assert_eq!(ChecksumState::classify(0x123, 0x123), ChecksumState::Plaintext);
        assert_eq!(
            ChecksumState::classify(0x123 ^ ENCRYPTED_MARK, 0x123),
            ChecksumState::Encrypted
        );
        assert_eq!(ChecksumState::classify(0x124, 0x123), ChecksumState::Invalid);
    }

    #[test]
    fn single_bit_flip_is_never_a_valid_state() {
        let expected = 0x5a5;
        for bit in 0..12 {
            let stored = expected ^ (1 << bit);
            assert_eq!(ChecksumState::classify(stored, expected), ChecksumState::Invalid);
            let stored = expected ^ ENCRYPTED_MARK ^ (1 << bit);
            assert_eq!(ChecksumState::classify(stored, expected), ChecksumState::Invalid);
        }
    }

    #[test]
    fn mark_values() {
        assert_eq!(ChecksumState::Plaintext.mark(), Some(0));
        assert_eq!(ChecksumState::Encrypted.mark(), Some(ENCRYPTED_MARK));
        assert_eq!(ChecksumState::Invalid.mark(), None);
    }
}
