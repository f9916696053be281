//! Core shared types for the Polyseed mnemonic seed scheme.
//!
//! This crate defines the bit layout constants, the network identifier
//! ([`Coin`]), the feature bitmask ([`Features`]) and the unified error
//! type. No other crate in the workspace should define shared types.

pub mod config;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Bit layout
// ---------------------------------------------------------------------------

/// Number of words in a mnemonic phrase.
pub const NUM_WORDS: usize = 16;

/// Number of bits encoded by a single word.
pub const BITS_PER_WORD: usize = 11;

/// Number of entries in every wordlist (`2^BITS_PER_WORD`).
pub const WORDLIST_SIZE: usize = 1 << BITS_PER_WORD;

/// Total number of bits carried by a phrase (16 × 11).
pub const TOTAL_BITS: usize = NUM_WORDS * BITS_PER_WORD;

/// Width of the secret entropy field.
pub const ENTROPY_BITS: usize = 150;

/// Width of the birthday field.
pub const BIRTHDAY_BITS: usize = 10;

/// Width of the feature field.
pub const FEATURE_BITS: usize = 4;

/// Width of the checksum field.
pub const CHECKSUM_BITS: usize = 12;

/// Bits covered by the checksum: entropy ∥ birthday ∥ features.
pub const PAYLOAD_BITS: usize = ENTROPY_BITS + BIRTHDAY_BITS + FEATURE_BITS;

/// Bytes needed to hold the entropy field (the last byte is partially used).
pub const ENTROPY_BYTES: usize = ENTROPY_BITS.div_ceil(8);

/// Mask applied to the last entropy byte; the unused low bits stay zero.
pub const ENTROPY_LAST_BYTE_MASK: u8 = 0xFF << (ENTROPY_BYTES * 8 - ENTROPY_BITS);

/// Bytes needed to hold the packed checksum payload.
pub const PAYLOAD_BYTES: usize = PAYLOAD_BITS.div_ceil(8);

/// Largest birthday value representable in [`BIRTHDAY_BITS`].
pub const BIRTHDAY_MASK: u16 = (1 << BIRTHDAY_BITS) - 1;

/// Largest checksum value representable in [`CHECKSUM_BITS`].
pub const CHECKSUM_MASK: u16 = (1 << CHECKSUM_BITS) - 1;

/// Size of the serialized seed record.
pub const RECORD_SIZE: usize = 32;

/// Maximum encoded phrase length in bytes, excluding the terminator
/// reserved by foreign callers (360-byte buffers).
pub const MAX_PHRASE_BYTES: usize = 359;

const _: () = assert!(PAYLOAD_BITS + CHECKSUM_BITS == TOTAL_BITS);

// ---------------------------------------------------------------------------
// Coin
// ---------------------------------------------------------------------------

/// Network identifier a seed is used with.
///
/// The coin is mixed into the phrase checksum and the key derivation
/// salt, so the same seed yields unrelated phrases and keys on different
/// networks. Any `u16` is accepted; the well-known networks have named
/// constants.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Coin(u16);

impl Coin {
    /// Monero.
    pub const MONERO: Coin = Coin(0);
    /// Aeon.
    pub const AEON: Coin = Coin(1);
    /// Wownero.
    pub const WOWNERO: Coin = Coin(2);

    /// Creates a coin from its numeric identifier.
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Returns the numeric identifier.
    pub const fn id(self) -> u16 {
        self.0
    }
}

impl Default for Coin {
    fn default() -> Self {
        Self::MONERO
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MONERO => write!(f, "monero"),
            Self::AEON => write!(f, "aeon"),
            Self::WOWNERO => write!(f, "wownero"),
            Self(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for Coin {
    type Err = PolyseedError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monero" | "xmr" => Ok(Self::MONERO),
            "aeon" => Ok(Self::AEON),
            "wownero" | "wow" => Ok(Self::WOWNERO),
            other => other
                .parse::<u16>()
                .map(Self)
                .map_err(|_| PolyseedError::ConfigError {
                    reason: format!("unknown coin '{s}'"),
                }),
        }
    }
}

// ---------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------

/// Feature bitmask stored alongside the seed.
///
/// Bits `0..=2` are user features that callers may opt into through
/// [`config::SeedConfig`]. Bit 3 is reserved: new seeds never set it,
/// but decoded seeds keep whatever value they carried.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Features(u8);

impl Features {
    /// All bits of the feature field.
    pub const MASK: u8 = (1 << FEATURE_BITS) - 1;

    /// Bits available to callers.
    pub const USER_MASK: u8 = 0b0111;

    /// Reserved bits; zero on creation, round-tripped unchanged.
    pub const RESERVED_MASK: u8 = Self::MASK & !Self::USER_MASK;

    /// No features.
    pub const NONE: Features = Features(0);

    /// Builds a feature set, returning `None` if bits outside the
    /// 4-bit field are set.
    pub const fn new(bits: u8) -> Option<Self> {
        if bits & !Self::MASK != 0 {
            None
        } else {
            Some(Self(bits))
        }
    }

    /// Builds a feature set, silently dropping bits outside the field.
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    /// Returns the raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns the subset of `mask` that is set.
    pub const fn get(self, mask: u8) -> u8 {
        self.0 & mask
    }

    /// Returns `true` if every bit in `mask` is set.
    pub const fn contains(self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    /// Returns `true` if any reserved bit is set.
    pub const fn has_reserved(self) -> bool {
        self.0 & Self::RESERVED_MASK != 0
    }
}

impl fmt::Display for Features {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#06b}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PolyseedError
// ---------------------------------------------------------------------------

/// Central error type for the Polyseed system.
///
/// All crates in the workspace convert their internal errors into
/// variants of this enum. No error is recovered internally; a failed
/// operation never hands back a partially built seed.
#[derive(Debug, Error)]
pub enum PolyseedError {
    /// The phrase resolved to words but no language produced a valid
    /// checksum (mistyped word, wrong coin, or corruption).
    #[error("invalid checksum: {reason}")]
    InvalidChecksum {
        /// Human-readable description of the checksum failure.
        reason: String,
    },

    /// No registered language contains every word of the phrase.
    #[error("unknown language: {reason}")]
    UnknownLanguage {
        /// Human-readable description of the failed lookup.
        reason: String,
    },

    /// The requested language is not part of the registry.
    #[error("unsupported language: {name}")]
    UnsupportedLanguage {
        /// The name that was requested.
        name: String,
    },

    /// A binary seed record has the wrong size or an inconsistent layout.
    #[error("invalid record: {reason}")]
    InvalidRecord {
        /// Human-readable description of the layout violation.
        reason: String,
    },

    /// A host primitive failed (no entropy source, broken clock, KDF
    /// failure). Fatal, never retried.
    #[error("resource exhausted: {reason}")]
    ResourceExhausted {
        /// Human-readable description of the host failure.
        reason: String,
    },

    /// The phrase does not split into the expected number of words in
    /// any registered language.
    #[error("wrong number of words: expected {expected}, got {found}")]
    WordCount {
        /// Required word count.
        expected: usize,
        /// Word count of the input (whitespace split).
        found: usize,
    },

    /// A phrase exceeds the maximum encoded length.
    #[error("phrase too long: {len} bytes exceeds maximum of {max}")]
    PhraseTooLong {
        /// Length of the offending phrase in bytes.
        len: usize,
        /// Maximum allowed length in bytes.
        max: usize,
    },

    /// Seed creation requested features that the configuration does not
    /// enable.
    #[error("unsupported features: {reason}")]
    UnsupportedFeatures {
        /// Human-readable description of the rejected bits.
        reason: String,
    },

    /// A configuration value is invalid or missing.
    #[error("config error: {reason}")]
    ConfigError {
        /// Human-readable description of the configuration problem.
        reason: String,
    },

    /// A requested key length is zero or above the supported maximum.
    #[error("invalid key length: {len} bytes (allowed 1..={max})")]
    KeyLength {
        /// The requested length in bytes.
        len: usize,
        /// Maximum supported length in bytes.
        max: usize,
    },

    /// Reading or writing a record file failed.
    #[error("storage error: {reason}")]
    StorageError {
        /// Human-readable description of the I/O failure.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// Result alias
// ---------------------------------------------------------------------------

/// Convenience result type using [`PolyseedError`].
pub type Result<T> = std::result::Result<T, PolyseedError>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_constants_are_consistent() {
        assert_eq!(TOTAL_BITS, 176);
        assert_eq!(ENTROPY_BYTES, 19);
        assert_eq!(ENTROPY_LAST_BYTE_MASK, 0xFC);
        assert_eq!(PAYLOAD_BITS, 164);
        assert_eq!(PAYLOAD_BYTES, 21);
        assert_eq!(BIRTHDAY_MASK, 0x3FF);
        assert_eq!(CHECKSUM_MASK, 0xFFF);
        assert_eq!(WORDLIST_SIZE, 2048);
    }

    #[test]
    fn coin_parse_names_and_numbers() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert_eq!("monero".parse::<Coin>()?, Coin::MONERO);
        assert_eq!("AEON".parse::<Coin>()?, Coin::AEON);
        assert_eq!("wow".parse::<Coin>()?, Coin::WOWNERO);
        assert_eq!("77".parse::<Coin>()?, Coin::new(77));
        Ok(())
    }

    #[test]
    fn coin_parse_rejects_garbage() {
        assert!("bitcoin".parse::<Coin>().is_err());
        assert!("70000".parse::<Coin>().is_err());
    }

    #[test]
    fn coin_display() {
        assert_eq!(Coin::MONERO.to_string(), "monero");
        assert_eq!(Coin::new(9).to_string(), "9");
    }

    #[test]
    fn features_reject_out_of_range_bits() {
        assert!(Features::new(0b1_0000).is_none());
        assert_eq!(Features::new(0b0101).map(Features::bits), Some(0b0101));
        assert_eq!(Features::from_bits_truncate(0xFF).bits(), Features::MASK);
    }

    #[test]
    fn features_queries() {
        let f = Features::from_bits_truncate(0b1001);
        assert!(f.contains(0b0001));
        assert!(!f.contains(0b0011));
        assert_eq!(f.get(0b0011), 0b0001);
        assert!(f.has_reserved());
        assert!(!Features::NONE.has_reserved());
    }

    #[test]
    fn coin_serde_json_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&Coin::WOWNERO)?;
        let parsed: Coin = serde_json::from_str(&json)?;
        assert_eq!(parsed, Coin::WOWNERO);
        Ok(())
    }

    #[test]
    fn error_display() {
        let err = PolyseedError::WordCount {
            expected: 16,
            found: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("16"));
        assert!(msg.contains('3'));
    }
}
