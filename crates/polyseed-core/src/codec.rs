//! Phrase codec: bit packing, phrase encoding and language detection.
//!
//! # Bit stream
//!
//! ```text
//! bit     0 ........ 149 150 ..... 159 160 .. 163 164 ...... 175
//!         entropy (150)  birthday (10) features(4) checksum (12)
//! ```
//!
//! The stream is 176 bits, MSB-first, split into 16 words of 11 bits.
//! The first 164 bits (zero padded to 21 bytes) are the checksum
//! payload.

use std::sync::Arc;

use polyseed_crypto::checksum::{phrase_checksum, state_checksum, ChecksumState};
use polyseed_crypto::provider::Primitives;
use polyseed_types::{
    Coin, Features, PolyseedError, Result, BIRTHDAY_BITS, BITS_PER_WORD, CHECKSUM_BITS,
    ENTROPY_BITS, ENTROPY_BYTES, ENTROPY_LAST_BYTE_MASK, FEATURE_BITS, MAX_PHRASE_BYTES,
    NUM_WORDS, PAYLOAD_BITS, PAYLOAD_BYTES, TOTAL_BITS,
};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::lang::Language;
use crate::mnemonic::Mnemonic;
use crate::seed::Seed;

const BIRTHDAY_OFFSET: usize = ENTROPY_BITS;
const FEATURES_OFFSET: usize = BIRTHDAY_OFFSET + BIRTHDAY_BITS;
const CHECKSUM_OFFSET: usize = PAYLOAD_BITS;
const STREAM_BYTES: usize = TOTAL_BITS / 8;

// ---------------------------------------------------------------------------
// Bit stream
// ---------------------------------------------------------------------------

/// The full 176-bit word stream. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub(crate) struct Stream([u8; STREAM_BYTES]);

impl Stream {
    /// Packs the seed fields and a checksum value.
    ///
    /// `entropy` must have its padding bits clear.
    pub(crate) fn pack(
        entropy: &[u8; ENTROPY_BYTES],
        birthday: u16,
        features: Features,
        checksum: u16,
    ) -> Self {
        let mut stream = Self([0u8; STREAM_BYTES]);
        stream.0[..ENTROPY_BYTES].copy_from_slice(entropy);
        stream.write(BIRTHDAY_OFFSET, birthday, BIRTHDAY_BITS);
        stream.write(FEATURES_OFFSET, u16::from(features.bits()), FEATURE_BITS);
        stream.write(CHECKSUM_OFFSET, checksum, CHECKSUM_BITS);
        stream
    }

    /// Rebuilds the stream from 16 word indices.
    pub(crate) fn from_indices(indices: &[u16; NUM_WORDS]) -> Self {
        let mut stream = Self([0u8; STREAM_BYTES]);
        for (i, &index) in indices.iter().enumerate() {
            stream.write(i * BITS_PER_WORD, index, BITS_PER_WORD);
        }
        stream
    }

    /// Splits the stream into 16 word indices.
    pub(crate) fn indices(&self) -> Zeroizing<[u16; NUM_WORDS]> {
        let mut indices = Zeroizing::new([0u16; NUM_WORDS]);
        for (i, slot) in indices.iter_mut().enumerate() {
            *slot = self.read(i * BITS_PER_WORD, BITS_PER_WORD);
        }
        indices
    }

    pub(crate) fn entropy(&self) -> Zeroizing<[u8; ENTROPY_BYTES]> {
        let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
        entropy.copy_from_slice(&self.0[..ENTROPY_BYTES]);
        entropy[ENTROPY_BYTES - 1] &= ENTROPY_LAST_BYTE_MASK;
        entropy
    }

    pub(crate) fn birthday(&self) -> u16 {
        self.read(BIRTHDAY_OFFSET, BIRTHDAY_BITS)
    }

    pub(crate) fn features(&self) -> Features {
        // Four bits always fit the feature field.
        Features::from_bits_truncate(self.read(FEATURES_OFFSET, FEATURE_BITS) as u8)
    }

    pub(crate) fn checksum(&self) -> u16 {
        self.read(CHECKSUM_OFFSET, CHECKSUM_BITS)
    }

    /// The checksum payload: the first 164 bits, zero padded.
    pub(crate) fn payload(&self) -> Zeroizing<[u8; PAYLOAD_BYTES]> {
        let mut payload = Zeroizing::new([0u8; PAYLOAD_BYTES]);
        payload.copy_from_slice(&self.0[..PAYLOAD_BYTES]);
        let used = PAYLOAD_BITS - (PAYLOAD_BYTES - 1) * 8;
        payload[PAYLOAD_BYTES - 1] &= 0xFF << (8 - used);
        payload
    }

    fn write(&mut self, offset: usize, value: u16, width: usize) {
        for i in 0..width {
            if (value >> (width - 1 - i)) & 1 == 1 {
                let bit = offset + i;
                self.0[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
    }

    fn read(&self, offset: usize, width: usize) -> u16 {
        let mut value = 0u16;
        for i in 0..width {
            let bit = offset + i;
            value = (value << 1) | u16::from((self.0[bit / 8] >> (7 - bit % 8)) & 1);
        }
        value
    }
}

/// Packs the checksum payload of a seed.
pub(crate) fn payload_of(
    entropy: &[u8; ENTROPY_BYTES],
    birthday: u16,
    features: Features,
) -> Zeroizing<[u8; PAYLOAD_BYTES]> {
    Stream::pack(entropy, birthday, features, 0).payload()
}

// ---------------------------------------------------------------------------
// Encode
// ---------------------------------------------------------------------------

/// Encodes `seed` as a phrase in `language` for `coin`.
///
/// The phrase checksum carries the same encrypted mark as the seed's
/// stored checksum, so encrypted seeds encode to phrases that decode
/// back to encrypted seeds.
///
/// # Errors
///
/// - [`PolyseedError::InvalidChecksum`] if the seed's stored checksum is
///   inconsistent with its fields.
/// - [`PolyseedError::PhraseTooLong`] if the joined phrase exceeds
///   [`MAX_PHRASE_BYTES`].
pub(crate) fn encode(seed: &Seed, language: &'static Language, coin: Coin) -> Result<Mnemonic> {
    let payload = payload_of(seed.entropy(), seed.birthday_raw(), seed.features());
    let mark = ChecksumState::classify(seed.stored_checksum(), state_checksum(&payload))
        .mark()
        .ok_or_else(|| PolyseedError::InvalidChecksum {
            reason: "seed checksum does not match its contents".into(),
        })?;
    let checksum = phrase_checksum(&payload, language.id(), coin) ^ mark;

    let stream = Stream::pack(seed.entropy(), seed.birthday_raw(), seed.features(), checksum);
    let indices = stream.indices();

    let mut words = Vec::with_capacity(NUM_WORDS);
    for &index in indices.iter() {
        let word = language
            .word(index)
            .ok_or_else(|| PolyseedError::UnsupportedLanguage {
                name: format!("{} has no word at index {index}", language.name_en()),
            })?;
        words.push(word);
    }

    let mut phrase = Zeroizing::new(words.join(language.word_separator()));
    if language.composes_output() {
        phrase = Zeroizing::new(seed.primitives().normalize_nfc(&phrase));
    }

    if phrase.len() > MAX_PHRASE_BYTES {
        return Err(PolyseedError::PhraseTooLong {
            len: phrase.len(),
            max: MAX_PHRASE_BYTES,
        });
    }

    Ok(Mnemonic::new(std::mem::take(&mut *phrase), language))
}

// ---------------------------------------------------------------------------
// Decode
// ---------------------------------------------------------------------------

/// A language whose vocabulary and checksum both accept the phrase.
struct Candidate {
    language: &'static Language,
    stream: Stream,
    state: ChecksumState,
}

/// Decodes a phrase, detecting its language.
///
/// Every registered language is tried in registry order. The first one
/// that resolves all 16 words and validates the checksum (plain or
/// encrypted) wins; later matches are logged as collisions.
///
/// # Errors
///
/// - [`PolyseedError::PhraseTooLong`] for input over [`MAX_PHRASE_BYTES`].
/// - [`PolyseedError::WordCount`] if no language splits the phrase into
///   16 words.
/// - [`PolyseedError::UnknownLanguage`] if no language knows every word.
/// - [`PolyseedError::InvalidChecksum`] if words resolve but no checksum
///   validates.
pub(crate) fn decode(
    primitives: &Arc<dyn Primitives>,
    phrase: &str,
    coin: Coin,
) -> Result<(Seed, &'static Language)> {
    if phrase.len() > MAX_PHRASE_BYTES {
        return Err(PolyseedError::PhraseTooLong {
            len: phrase.len(),
            max: MAX_PHRASE_BYTES,
        });
    }

    let folded = Zeroizing::new(primitives.normalize_nfkd(phrase).to_lowercase());

    let mut counted = false;
    let mut resolved = false;
    let mut winner: Option<Candidate> = None;

    for language in Language::all() {
        let tokens = Zeroizing::new(language.tokenize(&folded));
        if tokens.len() != NUM_WORDS {
            continue;
        }
        counted = true;

        let Some(indices) = resolve(language, &tokens) else {
            tracing::debug!(language = language.name_en(), "phrase words not in wordlist");
            continue;
        };
        resolved = true;

        let stream = Stream::from_indices(&indices);
        let expected = phrase_checksum(&stream.payload(), language.id(), coin);
        let state = ChecksumState::classify(stream.checksum(), expected);
        if state == ChecksumState::Invalid {
            tracing::debug!(language = language.name_en(), "phrase checksum mismatch");
            continue;
        }

        if let Some(first) = &winner {
            tracing::warn!(
                chosen = first.language.name_en(),
                also = language.name_en(),
                "phrase is valid in more than one language"
            );
            continue;
        }
        winner = Some(Candidate {
            language,
            stream,
            state,
        });
    }

    let Some(candidate) = winner else {
        return Err(if !counted {
            PolyseedError::WordCount {
                expected: NUM_WORDS,
                found: folded.split_whitespace().count(),
            }
        } else if !resolved {
            PolyseedError::UnknownLanguage {
                reason: "no registered wordlist contains every word".into(),
            }
        } else {
            PolyseedError::InvalidChecksum {
                reason: format!("phrase does not validate for coin {coin} in any language"),
            }
        });
    };

    let mark = candidate.state.mark().unwrap_or_default();
    let stream = &candidate.stream;
    let state = state_checksum(&stream.payload()) ^ mark;
    let seed = Seed::from_parts(
        Arc::clone(primitives),
        &stream.entropy(),
        stream.birthday(),
        stream.features(),
        state,
    );

    tracing::debug!(
        language = candidate.language.name_en(),
        encrypted = candidate.state == ChecksumState::Encrypted,
        "phrase decoded"
    );

    Ok((seed, candidate.language))
}

fn resolve(language: &Language, tokens: &[String]) -> Option<Zeroizing<[u16; NUM_WORDS]>> {
    let mut indices = Zeroizing::new([0u16; NUM_WORDS]);
    for (slot, token) in indices.iter_mut().zip(tokens) {
        *slot = language.lookup(token)?;
    }
    Some(indices)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
