//! Binary seed record: layout validation, load and store.
//!
//! # Record layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//!   0       8   Magic bytes: b"POLYSEED"
//!   8       2   u16 LE: birthday (bits 0..=9), features (bits 10..=13),
//!               bits 14..=15 zero
//!  10      19   Entropy (low 2 bits of the last byte zero)
//!  29       2   u16 LE state checksum (12 bits, high 4 bits zero)
//!  31       1   Footer: 0x7F
//! ```
//!
//! The record is coin- and language-independent. Encrypted seeds are
//! stored as they are; the checksum carries the encrypted mark.

use std::path::Path;
use std::sync::Arc;

use polyseed_crypto::checksum::ChecksumState;
use polyseed_crypto::provider::Primitives;
use polyseed_types::{
    Features, PolyseedError, Result, BIRTHDAY_BITS, BIRTHDAY_MASK, CHECKSUM_MASK, ENTROPY_BYTES,
    ENTROPY_LAST_BYTE_MASK, RECORD_SIZE,
};
use zeroize::Zeroizing;

use crate::seed::Seed;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes opening every record.
pub const RECORD_MAGIC: [u8; 8] = *b"POLYSEED";

/// Final byte of every record.
pub const RECORD_FOOTER: u8 = 0x7F;

const FIELDS_OFFSET: usize = 8;
const ENTROPY_OFFSET: usize = 10;
const CHECKSUM_OFFSET: usize = ENTROPY_OFFSET + ENTROPY_BYTES;
const FOOTER_OFFSET: usize = RECORD_SIZE - 1;

/// Bits of the birthday/features word that must be zero.
const FIELDS_RESERVED_MASK: u16 = 0xC000;

const _: () = assert!(CHECKSUM_OFFSET + 2 == FOOTER_OFFSET);

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Serializes `seed` into a record. Infallible.
pub(crate) fn store(seed: &Seed) -> Zeroizing<[u8; RECORD_SIZE]> {
    let mut record = Zeroizing::new([0u8; RECORD_SIZE]);

    let fields = seed.birthday_raw() | (u16::from(seed.features().bits()) << BIRTHDAY_BITS);

    record[..FIELDS_OFFSET].copy_from_slice(&RECORD_MAGIC);
    record[FIELDS_OFFSET..ENTROPY_OFFSET].copy_from_slice(&fields.to_le_bytes());
    record[ENTROPY_OFFSET..CHECKSUM_OFFSET].copy_from_slice(seed.entropy());
    record[CHECKSUM_OFFSET..FOOTER_OFFSET].copy_from_slice(&seed.stored_checksum().to_le_bytes());
    record[FOOTER_OFFSET] = RECORD_FOOTER;

    record
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Parses and validates a record.
///
/// # Validation order
///
/// 1. Length is exactly [`RECORD_SIZE`].
/// 2. Magic bytes and footer.
/// 3. Reserved bits of the birthday/features word.
/// 4. Entropy padding bits.
/// 5. Checksum range, then checksum against the contents (plain or
///    encrypted form).
///
/// # Errors
///
/// Returns [`PolyseedError::InvalidRecord`] on the first failed check.
pub(crate) fn load(primitives: &Arc<dyn Primitives>, data: &[u8]) -> Result<Seed> {
    // 1. Exact size, never padded or truncated.
    if data.len() != RECORD_SIZE {
        return Err(PolyseedError::InvalidRecord {
            reason: format!(
                "record must be exactly {RECORD_SIZE} bytes, got {}",
                data.len()
            ),
        });
    }

    // 2. Framing.
    if data[..FIELDS_OFFSET] != RECORD_MAGIC {
        return Err(PolyseedError::InvalidRecord {
            reason: "record magic mismatch".into(),
        });
    }
    if data[FOOTER_OFFSET] != RECORD_FOOTER {
        return Err(PolyseedError::InvalidRecord {
            reason: format!(
                "record footer mismatch: expected {RECORD_FOOTER:#04x}, got {:#04x}",
                data[FOOTER_OFFSET]
            ),
        });
    }

    // 3. Birthday and features.
    let fields = u16::from_le_bytes([data[FIELDS_OFFSET], data[FIELDS_OFFSET + 1]]);
    if fields & FIELDS_RESERVED_MASK != 0 {
        return Err(PolyseedError::InvalidRecord {
            reason: format!("reserved bits set in birthday/features word {fields:#06x}"),
        });
    }
    let birthday = fields & BIRTHDAY_MASK;
    // At most four bits remain after the shift.
    let features = Features::from_bits_truncate((fields >> BIRTHDAY_BITS) as u8);

    // 4. Entropy padding.
    let mut entropy = Zeroizing::new([0u8; ENTROPY_BYTES]);
    entropy.copy_from_slice(&data[ENTROPY_OFFSET..CHECKSUM_OFFSET]);
    if entropy[ENTROPY_BYTES - 1] & !ENTROPY_LAST_BYTE_MASK != 0 {
        return Err(PolyseedError::InvalidRecord {
            reason: "entropy padding bits are not zero".into(),
        });
    }

    // 5. Checksum.
    let checksum = u16::from_le_bytes([data[CHECKSUM_OFFSET], data[CHECKSUM_OFFSET + 1]]);
    if checksum & !CHECKSUM_MASK != 0 {
        return Err(PolyseedError::InvalidRecord {
            reason: format!("checksum {checksum:#06x} exceeds 12 bits"),
        });
    }

    let seed = Seed::from_parts(Arc::clone(primitives), &entropy, birthday, features, checksum);
    if seed.checksum_state() == ChecksumState::Invalid {
        return Err(PolyseedError::InvalidRecord {
            reason: "record checksum does not match its contents".into(),
        });
    }

    Ok(seed)
}

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Writes a record to disk.
///
/// # Errors
///
/// Returns [`PolyseedError::StorageError`] if the file cannot be written.
pub(crate) fn write_record_file(path: &Path, record: &[u8; RECORD_SIZE]) -> Result<()> {
    std::fs::write(path, record).map_err(|e| PolyseedError::StorageError {
        reason: format!("failed to write record file {}: {e}", path.display()),
    })
}

/// Reads a record file without validating it.
///
/// # Errors
///
/// Returns [`PolyseedError::StorageError`] if the file cannot be read.
pub(crate) fn read_record_file(path: &Path) -> Result<Zeroizing<Vec<u8>>> {
    std::fs::read(path)
        .map(Zeroizing::new)
        .map_err(|e| PolyseedError::StorageError {
            reason: format!("failed to read record file {}: {e}", path.display()),
        })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
