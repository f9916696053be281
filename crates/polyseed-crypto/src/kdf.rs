//! PBKDF2-SHA256 derivations used by the seed.
//!
//! Two derivations share the injected PBKDF2 primitive and differ only
//! in their salts:
//!
//! | Purpose | Password | Salt |
//! |---------|----------|------|
//! | encryption mask | NFKD(password) | `"POLYSEED mask"` ∥ `00 ff ff` ∥ birthday (u32 LE) |
//! | key generation | entropy bytes | `"POLYSEED key"` ∥ `00 ff ff ff` ∥ coin ∥ birthday ∥ features (u32 LE each) |
//!
//! One password yields different masks for seeds with different
//! birthdays, and one seed yields unrelated keys on different coins.

use polyseed_types::{
    Coin, Features, PolyseedError, Result, ENTROPY_BYTES, ENTROPY_LAST_BYTE_MASK,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::Primitives;

/// PBKDF2 iteration count for both derivations.
pub const KDF_ITERATIONS: u32 = 10_000;

/// Largest key [`derive_key`] will produce, in bytes.
pub const MAX_KEY_BYTES: usize = 1024;

/// Fixed 16-byte prefix of the encryption mask salt.
const MASK_SALT_PREFIX: &[u8; 16] = b"POLYSEED mask\x00\xff\xff";

/// Fixed 16-byte prefix of the key generation salt.
const KEY_SALT_PREFIX: &[u8; 16] = b"POLYSEED key\x00\xff\xff\xff";

// ---------------------------------------------------------------------------
// EntropyMask
// ---------------------------------------------------------------------------

/// Keystream XORed over the entropy field.
///
/// The unused low bits of the last byte are cleared so that applying
/// the mask never disturbs the padding. Zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct EntropyMask([u8; ENTROPY_BYTES]);

impl EntropyMask {
    /// XORs the mask over `entropy` in place.
    pub fn apply(&self, entropy: &mut [u8; ENTROPY_BYTES]) {
        for (byte, mask) in entropy.iter_mut().zip(self.0.iter()) {
            *byte ^= mask;
        }
    }

    /// Returns the raw mask bytes.
    pub fn as_bytes(&self) -> &[u8; ENTROPY_BYTES] {
        &self.0
    }
}

// EntropyMask does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// SeedKey
// ---------------------------------------------------------------------------

/// Network-specific key material derived from a seed.
///
/// Automatically zeroized when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SeedKey {
    bytes: Vec<u8>,
}

impl SeedKey {
    /// Returns the key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the key length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if a zero-length key was requested.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// SeedKey does not implement Clone/Debug to prevent leakage.

// ---------------------------------------------------------------------------
// Salts
// ---------------------------------------------------------------------------

/// Builds the encryption mask salt for a seed born at `birthday`.
pub fn mask_salt(birthday: u16) -> [u8; 20] {
    let mut salt = [0u8; 20];
    salt[..16].copy_from_slice(MASK_SALT_PREFIX);
    salt[16..].copy_from_slice(&u32::from(birthday).to_le_bytes());
    salt
}

/// Builds the key generation salt for `coin`.
pub fn key_salt(coin: Coin, birthday: u16, features: Features) -> [u8; 28] {
    let mut salt = [0u8; 28];
    salt[..16].copy_from_slice(KEY_SALT_PREFIX);
    salt[16..20].copy_from_slice(&u32::from(coin.id()).to_le_bytes());
    salt[20..24].copy_from_slice(&u32::from(birthday).to_le_bytes());
    salt[24..].copy_from_slice(&u32::from(features.bits()).to_le_bytes());
    salt
}

// ---------------------------------------------------------------------------
// Derivations
// ---------------------------------------------------------------------------

/// Derives the entropy encryption mask from a password.
///
/// The password is NFKD-normalized first; the normalized copy is wiped
/// before returning.
///
/// # Errors
///
/// Propagates [`PolyseedError::ResourceExhausted`] from the PBKDF2
/// primitive.
pub fn derive_mask(
    primitives: &dyn Primitives,
    password: &str,
    birthday: u16,
) -> Result<EntropyMask> {
    let mut normalized = primitives.normalize_nfkd(password).into_bytes();
    let salt = mask_salt(birthday);
    let mut mask = EntropyMask([0u8; ENTROPY_BYTES]);

    let result = primitives.pbkdf2_sha256(&normalized, &salt, KDF_ITERATIONS, &mut mask.0);
    primitives.secure_zero(&mut normalized);
    result?;

    mask.0[ENTROPY_BYTES - 1] &= ENTROPY_LAST_BYTE_MASK;
    Ok(mask)
}

/// Derives `key_len` bytes of key material for `coin`.
///
/// The entropy is used as the PBKDF2 password; the salt binds the coin,
/// birthday and features.
///
/// # Errors
///
/// Returns [`PolyseedError::KeyLength`] unless `1 <= key_len <= MAX_KEY_BYTES`.
pub fn derive_key(
    primitives: &dyn Primitives,
    entropy: &[u8; ENTROPY_BYTES],
    coin: Coin,
    birthday: u16,
    features: Features,
    key_len: usize,
) -> Result<SeedKey> {
    if key_len == 0 || key_len > MAX_KEY_BYTES {
        return Err(PolyseedError::KeyLength {
            len: key_len,
            max: MAX_KEY_BYTES,
        });
    }
    let salt = key_salt(coin, birthday, features);
    let mut key = SeedKey {
        bytes: vec![0u8; key_len],
    };
    primitives.pbkdf2_sha256(entropy, &salt, KDF_ITERATIONS, &mut key.bytes)?;
    Ok(key)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
