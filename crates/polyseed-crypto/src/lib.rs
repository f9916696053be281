//! Cryptographic building blocks for the Polyseed mnemonic seed scheme.
//!
//! This crate is the **sole** location for hashing, key derivation and
//! host primitives. The codec crate never calls SHA-256, PBKDF2 or the
//! OS random source directly.
//!
//! # Modules
//!
//! - [`provider`]: injected host primitives ([`provider::Primitives`])
//! - [`checksum`]: 12-bit state and phrase checksums
//! - [`kdf`]: PBKDF2 encryption mask and key generation

pub mod checksum;
pub mod kdf;
pub mod provider;
