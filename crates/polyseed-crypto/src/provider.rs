//! Host primitives injected into the seed codec.
//!
//! The codec never talks to the operating system directly. Everything
//! it needs from the host (randomness, PBKDF2, Unicode normalization,
//! secure wiping and the clock) goes through the [`Primitives`] trait,
//! so tests can substitute deterministic randomness and a cheap KDF.

use std::sync::Mutex;

use hmac::Hmac;
use polyseed_types::{PolyseedError, Result};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use unicode_normalization::UnicodeNormalization;
use zeroize::Zeroize;

// ---------------------------------------------------------------------------
// Primitives
// ---------------------------------------------------------------------------

/// Capability interface the codec depends on.
///
/// Implementations must be safe to share across threads: several seeds
/// may be created concurrently against one provider, so the random
/// source has to serialize access internally.
///
/// Failures are reserved for catastrophic host conditions and surface as
/// [`PolyseedError::ResourceExhausted`]. Callers treat them as fatal.
pub trait Primitives: Send + Sync {
    /// Fills `buf` with cryptographically secure random bytes.
    fn fill_random(&self, buf: &mut [u8]) -> Result<()>;

    /// PBKDF2-HMAC-SHA256, writing `out.len()` bytes into `out`.
    fn pbkdf2_sha256(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) -> Result<()>;

    /// Unicode canonical composition (NFC).
    fn normalize_nfc(&self, text: &str) -> String;

    /// Unicode compatibility decomposition (NFKD).
    fn normalize_nfkd(&self, text: &str) -> String;

    /// Overwrites `buf` with zeros in a way the optimizer cannot elide.
    fn secure_zero(&self, buf: &mut [u8]);

    /// Current wall-clock time as seconds since the unix epoch.
    fn current_unix_time(&self) -> Result<u64>;
}

fn pbkdf2_hmac_sha256(password: &[u8], salt: &[u8], iterations: u32, out: &mut [u8]) -> Result<()> {
    if iterations == 0 {
        return Err(PolyseedError::ResourceExhausted {
            reason: "PBKDF2 iteration count must be at least 1".into(),
        });
    }
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, iterations, out).map_err(|e| {
        PolyseedError::ResourceExhausted {
            reason: format!("PBKDF2-HMAC-SHA256 failed: {e}"),
        }
    })
}

// ---------------------------------------------------------------------------
// OsPrimitives
// ---------------------------------------------------------------------------

/// Production provider backed by the operating system.
///
/// - randomness: [`OsRng`], serialized behind a mutex
/// - KDF: `pbkdf2` with `Hmac<Sha256>`
/// - normalization: `unicode-normalization`
/// - wiping: `zeroize`
/// - clock: `chrono::Utc::now`
#[derive(Default)]
pub struct OsPrimitives {
    rng: Mutex<OsRng>,
}

impl OsPrimitives {
    /// Creates a new OS-backed provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Primitives for OsPrimitives {
    fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        let mut rng = self.rng.lock().map_err(|_| PolyseedError::ResourceExhausted {
            reason: "random source lock poisoned".into(),
        })?;
        rng.try_fill_bytes(buf)
            .map_err(|e| PolyseedError::ResourceExhausted {
                reason: format!("OS entropy source unavailable: {e}"),
            })
    }

    fn pbkdf2_sha256(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) -> Result<()> {
        pbkdf2_hmac_sha256(password, salt, iterations, out)
    }

    fn normalize_nfc(&self, text: &str) -> String {
        text.nfc().collect()
    }

    fn normalize_nfkd(&self, text: &str) -> String {
        text.nfkd().collect()
    }

    fn secure_zero(&self, buf: &mut [u8]) {
        buf.zeroize();
    }

    fn current_unix_time(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        u64::try_from(now).map_err(|_| PolyseedError::ResourceExhausted {
            reason: format!("system clock reports a time before the unix epoch: {now}"),
        })
    }
}

// ---------------------------------------------------------------------------
// DeterministicPrimitives
// ---------------------------------------------------------------------------

/// Reproducible provider for tests.
///
/// Random bytes come from a seeded [`StdRng`](rand::rngs::StdRng), the
/// clock is fixed, and the PBKDF2 iteration count is capped so that key
/// derivation is fast. With the cap removed the KDF output matches
/// [`OsPrimitives`] exactly.
#[cfg(any(test, feature = "test-utils"))]
pub struct DeterministicPrimitives {
    rng: Mutex<rand::rngs::StdRng>,
    now: u64,
    iteration_cap: Option<u32>,
}

#[cfg(any(test, feature = "test-utils"))]
impl DeterministicPrimitives {
    /// Iteration cap applied by [`new`](Self::new).
    pub const DEFAULT_ITERATION_CAP: u32 = 1;

    /// Creates a provider seeded with `seed` whose clock always reads `now`.
    pub fn new(seed: u64, now: u64) -> Self {
        use rand::SeedableRng;

        Self {
            rng: Mutex::new(rand::rngs::StdRng::seed_from_u64(seed)),
            now,
            iteration_cap: Some(Self::DEFAULT_ITERATION_CAP),
        }
    }

    /// Replaces the iteration cap; `None` runs the full iteration count.
    pub fn with_iteration_cap(mut self, cap: Option<u32>) -> Self {
        self.iteration_cap = cap;
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl Primitives for DeterministicPrimitives {
    fn fill_random(&self, buf: &mut [u8]) -> Result<()> {
        let mut rng = self.rng.lock().map_err(|_| PolyseedError::ResourceExhausted {
            reason: "random source lock poisoned".into(),
        })?;
        rng.fill_bytes(buf);
        Ok(())
    }

    fn pbkdf2_sha256(
        &self,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        out: &mut [u8],
    ) -> Result<()> {
        let iterations = match self.iteration_cap {
            Some(cap) => iterations.min(cap),
            None => iterations,
        };
        pbkdf2_hmac_sha256(password, salt, iterations, out)
    }

    fn normalize_nfc(&self, text: &str) -> String {
        text.nfc().collect()
    }

    fn normalize_nfkd(&self, text: &str) -> String {
        text.nfkd().collect()
    }

    fn secure_zero(&self, buf: &mut [u8]) {
        buf.zeroize();
    }

    fn current_unix_time(&self) -> Result<u64> {
        Ok(self.now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn os_random_fills_buffer() -> std::result::Result<(), PolyseedError> {
        let provider = OsPrimitives::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        provider.fill_random(&mut a)?;
        provider.fill_random(&mut b)?;
        assert_ne!(a, b);
        Ok(())
    }

    /// RFC 7914 §11 PBKDF2-HMAC-SHA256 vector: P="passwd", S="salt", c=1.
    #[test]
    fn pbkdf2_known_vector() -> std::result::Result<(), PolyseedError> {
        let provider = OsPrimitives::new();
        let mut out = [0u8; 16];
        provider.pbkdf2_sha256(b"passwd", b"salt", 1, &mut out)?;
        assert_eq!(hex::encode(out), "55ac046e56e3089fec1691c22544b605");
        Ok(())
    }

    #[test]
    fn pbkdf2_zero_iterations_rejected() {
        let provider = OsPrimitives::new();
        let mut out = [0u8; 16];
        assert!(provider.pbkdf2_sha256(b"pw", b"salt", 0, &mut out).is_err());
    }

    #[test]
    fn normalization_forms() {
        let provider = OsPrimitives::new();
        let composed = "\u{e9}";
        let decomposed = "e\u{301}";
        assert_eq!(provider.normalize_nfkd(composed), decomposed);
        assert_eq!(provider.normalize_nfc(decomposed), composed);
        // Compatibility mapping: ideographic space becomes a plain space.
        assert_eq!(provider.normalize_nfkd("\u{3000}"), " ");
    }

    #[test]
    fn secure_zero_clears() {
        let provider = OsPrimitives::new();
        let mut buf = [0xAAu8; 19];
        provider.secure_zero(&mut buf);
        assert_eq!(buf, [0u8; 19]);
    }

    #[test]
    fn os_clock_is_after_2021() -> std::result::Result<(), PolyseedError> {
        let now = OsPrimitives::new().current_unix_time()?;
        assert!(now > 1_635_768_000);
        Ok(())
    }

    #[test]
    fn deterministic_random_is_reproducible() -> std::result::Result<(), PolyseedError> {
        let a = DeterministicPrimitives::new(7, 0);
        let b = DeterministicPrimitives::new(7, 0);
        let mut x = [0u8; 19];
        let mut y = [0u8; 19];
        a.fill_random(&mut x)?;
        b.fill_random(&mut y)?;
        assert_eq!(x, y);
        Ok(())
    }

    #[test]
    fn deterministic_uncapped_matches_os() -> std::result::Result<(), PolyseedError> {
        let fake = DeterministicPrimitives::new(0, 0).with_iteration_cap(None);
        let os = OsPrimitives::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        fake.pbkdf2_sha256(b"pw", b"salt", 50, &mut a)?;
        os.pbkdf2_sha256(b"pw", b"salt", 50, &mut b)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn deterministic_cap_limits_iterations() -> std::result::Result<(), PolyseedError> {
        let capped = DeterministicPrimitives::new(0, 0);
        let os = OsPrimitives::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        capped.pbkdf2_sha256(b"pw", b"salt", 50, &mut a)?;
        os.pbkdf2_sha256(b"pw", b"salt", 1, &mut b)?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn deterministic_clock_is_fixed() -> std::result::Result<(), PolyseedError> {
        let provider = DeterministicPrimitives::new(0, 1_700_000_000);
        assert_eq!(provider.current_unix_time()?, 1_700_000_000);
        Ok(())
    }
}
