//! Seed state, creation context, encryption transform and key deriver.
//!
//! A [`Polyseed`] context owns the injected [`Primitives`] and the
//! [`SeedConfig`]; every [`Seed`] it produces keeps a handle to the same
//! primitives so that its entropy can be wiped through
//! [`Primitives::secure_zero`] when it is dropped.
//!
//! # Encryption state
//!
//! There is no encrypted flag anywhere. The stored checksum equals the
//! state checksum of the current contents when the entropy is plaintext
//! and that value XOR [`ENCRYPTED_MARK`] when it is encrypted.
//! [`Seed::crypt`] re-derives the checksum after every toggle, and
//! [`Seed::is_encrypted`] re-evaluates it on every call.

use std::path::Path;
use std::sync::Arc;

use polyseed_crypto::checksum::{state_checksum, ChecksumState, ENCRYPTED_MARK};
use polyseed_crypto::kdf::{derive_key, derive_mask, SeedKey};
use polyseed_crypto::provider::{OsPrimitives, Primitives};
use polyseed_types::config::SeedConfig;
use polyseed_types::{
    Coin, Features, PolyseedError, Result, ENTROPY_BYTES, ENTROPY_LAST_BYTE_MASK, RECORD_SIZE,
};
use zeroize::Zeroizing;

use crate::birthday;
use crate::codec;
use crate::lang::Language;
use crate::mnemonic::Mnemonic;
use crate::storage;

// ---------------------------------------------------------------------------
// Polyseed
// ---------------------------------------------------------------------------

/// Seed factory bound to one set of host primitives and one
/// configuration.
///
/// Cheap to share: the context is immutable after construction.
pub struct Polyseed {
    primitives: Arc<dyn Primitives>,
    config: SeedConfig,
}

impl Polyseed {
    /// Creates a context after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::ConfigError`] for an invalid configuration.
    pub fn new(primitives: Arc<dyn Primitives>, config: SeedConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { primitives, config })
    }

    /// Creates a context backed by [`OsPrimitives`].
    pub fn with_os_primitives(config: SeedConfig) -> Result<Self> {
        Self::new(Arc::new(OsPrimitives::new()), config)
    }

    /// Creates a fresh seed from random entropy and the current time.
    ///
    /// # Errors
    ///
    /// - [`PolyseedError::UnsupportedFeatures`] if `features` sets the
    ///   reserved bit or a bit the configuration does not enable.
    /// - [`PolyseedError::ResourceExhausted`] if randomness or the clock
    ///   is unavailable.
    pub fn create(&self, features: Features) -> Result<Seed> {
        if features.has_reserved() {
            return Err(PolyseedError::UnsupportedFeatures {
                reason: format!("reserved feature bits set in {features}"),
            });
        }
        if !self.config.allows(features) {
            return Err(PolyseedError::UnsupportedFeatures {
                reason: format!(
                    "features {features} not enabled (enabled mask {:#06b})",
                    self.config.enabled_features
                ),
            });
        }

        let now = self.primitives.current_unix_time()?;
        let mut seed = Seed::empty(Arc::clone(&self.primitives), birthday::encode(now), features);
        self.primitives.fill_random(&mut seed.entropy)?;
        seed.entropy[ENTROPY_BYTES - 1] &= ENTROPY_LAST_BYTE_MASK;
        seed.checksum = seed.plain_checksum();

        tracing::debug!(birthday = seed.birthday, features = %features, "seed created");
        Ok(seed)
    }

    /// Decodes a phrase for `coin`, detecting its language.
    ///
    /// See [`codec`](crate::codec) for the detection rules and errors.
    pub fn decode(&self, phrase: &str, coin: Coin) -> Result<(Seed, &'static Language)> {
        codec::decode(&self.primitives, phrase, coin)
    }

    /// Loads a seed from its 32-byte binary record.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::InvalidRecord`] for any layout violation.
    pub fn load(&self, record: &[u8]) -> Result<Seed> {
        storage::load(&self.primitives, record)
    }

    /// Reads a record file and loads the seed it contains.
    ///
    /// # Errors
    ///
    /// [`PolyseedError::StorageError`] if the file cannot be read,
    /// otherwise as [`load`](Self::load).
    pub fn load_file(&self, path: &Path) -> Result<Seed> {
        let data = storage::read_record_file(path)?;
        self.load(&data)
    }
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// In-memory seed state.
///
/// Exclusively owned by the caller. `Crypt` mutates it in place;
/// birthday and features never change after creation. The entropy is
/// wiped through the provider when the seed is dropped, including on
/// every error path during construction.
///
/// Seed does not implement Clone/Debug to prevent leakage.
pub struct Seed {
    entropy: [u8; ENTROPY_BYTES],
    birthday: u16,
    features: Features,
    checksum: u16,
    primitives: Arc<dyn Primitives>,
}

impl Seed {
    /// A seed with zero entropy. Callers fill it in before handing it out.
    fn empty(primitives: Arc<dyn Primitives>, birthday: u16, features: Features) -> Self {
        Self {
            entropy: [0u8; ENTROPY_BYTES],
            birthday,
            features,
            checksum: 0,
            primitives,
        }
    }

    pub(crate) fn from_parts(
        primitives: Arc<dyn Primitives>,
        entropy: &[u8; ENTROPY_BYTES],
        birthday: u16,
        features: Features,
        checksum: u16,
    ) -> Self {
        let mut seed = Self::empty(primitives, birthday, features);
        seed.entropy.copy_from_slice(entropy);
        seed.checksum = checksum;
        seed
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Creation time as unix seconds, rounded down to the birthday step.
    pub fn birthday(&self) -> u64 {
        birthday::decode(self.birthday)
    }

    /// Raw 10-bit birthday value.
    pub fn birthday_raw(&self) -> u16 {
        self.birthday
    }

    /// All feature bits, including reserved ones.
    pub fn features(&self) -> Features {
        self.features
    }

    /// Returns the subset of `mask` set on this seed.
    pub fn has_feature(&self, mask: u8) -> u8 {
        self.features.get(mask)
    }

    /// Returns `true` if the entropy is currently encrypted.
    ///
    /// Re-evaluated from the checksum on every call.
    pub fn is_encrypted(&self) -> bool {
        self.checksum_state() == ChecksumState::Encrypted
    }

    pub(crate) fn checksum_state(&self) -> ChecksumState {
        ChecksumState::classify(self.checksum, self.plain_checksum())
    }

    pub(crate) fn entropy(&self) -> &[u8; ENTROPY_BYTES] {
        &self.entropy
    }

    pub(crate) fn stored_checksum(&self) -> u16 {
        self.checksum
    }

    pub(crate) fn primitives(&self) -> &Arc<dyn Primitives> {
        &self.primitives
    }

    fn plain_checksum(&self) -> u16 {
        state_checksum(&codec::payload_of(&self.entropy, self.birthday, self.features))
    }

    // -----------------------------------------------------------------------
    // Encryption transform
    // -----------------------------------------------------------------------

    /// Encrypts plaintext entropy or decrypts encrypted entropy.
    ///
    /// XORs a PBKDF2 keystream derived from `password` and the birthday
    /// over the entropy, then re-derives the stored checksum for the new
    /// state. Applying it twice with the same password restores the
    /// original seed bit for bit. Decrypting with the wrong password is
    /// not detected; the result simply reports as plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::ResourceExhausted`] if the KDF fails; the
    /// seed is left unchanged in that case.
    pub fn crypt(&mut self, password: &str) -> Result<()> {
        let was_encrypted = self.is_encrypted();
        let mask = derive_mask(self.primitives.as_ref(), password, self.birthday)?;
        mask.apply(&mut self.entropy);

        let mark = if was_encrypted { 0 } else { ENCRYPTED_MARK };
        self.checksum = self.plain_checksum() ^ mark;

        tracing::debug!(encrypted = !was_encrypted, "seed entropy toggled");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Key deriver
    // -----------------------------------------------------------------------

    /// Derives `key_len` bytes of key material for `coin`.
    ///
    /// An encrypted seed is not rejected: it yields a key that belongs to
    /// no wallet. Check [`is_encrypted`](Self::is_encrypted) first.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::KeyLength`] for a zero or oversized
    /// `key_len` (see [`MAX_KEY_BYTES`](polyseed_crypto::kdf::MAX_KEY_BYTES)).
    pub fn keygen(&self, coin: Coin, key_len: usize) -> Result<SeedKey> {
        if self.is_encrypted() {
            tracing::debug!("deriving key from encrypted entropy");
        }
        derive_key(
            self.primitives.as_ref(),
            &self.entropy,
            coin,
            self.birthday,
            self.features,
            key_len,
        )
    }

    // -----------------------------------------------------------------------
    // Encoding and persistence
    // -----------------------------------------------------------------------

    /// Encodes the seed as a phrase in `language` for `coin`.
    pub fn encode(&self, language: &'static Language, coin: Coin) -> Result<Mnemonic> {
        codec::encode(self, language, coin)
    }

    /// Encodes the seed in the language called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyseedError::UnsupportedLanguage`] for an unknown name.
    pub fn encode_named(&self, name: &str, coin: Coin) -> Result<Mnemonic> {
        self.encode(Language::by_name(name)?, coin)
    }

    /// Serializes the seed into its 32-byte binary record.
    pub fn store(&self) -> Zeroizing<[u8; RECORD_SIZE]> {
        storage::store(self)
    }

    /// Writes the binary record to `path`.
    pub fn store_file(&self, path: &Path) -> Result<()> {
        storage::write_record_file(path, &self.store())
    }

    /// Wipes the seed immediately.
    ///
    /// Equivalent to dropping it; provided so the wipe is explicit at
    /// call sites.
    pub fn zeroize(self) {
        drop(self);
    }
}

impl Drop for Seed {
    fn drop(&mut self) {
        self.primitives.secure_zero(&mut self.entropy);
        self.birthday = 0;
        self.features = Features::NONE;
        self.checksum = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
