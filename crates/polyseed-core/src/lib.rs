//! Polyseed mnemonic seed codec.
//!
//! Handles the full seed lifecycle:
//!
//! - **Create** from random entropy and the current time
//! - **Encode / Decode** 16-word phrases in ten languages, with the
//!   language detected from the phrase alone
//! - **Encrypt / Decrypt** the entropy with a password (self-inverse)
//! - **Derive keys** per network
//! - **Load / Store** the 32-byte binary record
//!
//! ```no_run
//! use polyseed_core::{Coin, Features, Polyseed, SeedConfig};
//!
//! # fn main() -> polyseed_core::Result<()> {
//! let polyseed = Polyseed::with_os_primitives(SeedConfig::default())?;
//! let seed = polyseed.create(Features::NONE)?;
//! let phrase = seed.encode_named("en", Coin::MONERO)?;
//! let (restored, language) = polyseed.decode(phrase.as_str(), Coin::MONERO)?;
//! assert_eq!(language.code(), "en");
//! assert_eq!(*restored.store(), *seed.store());
//! # Ok(())
//! # }
//! ```

pub mod birthday;
mod codec;
pub mod lang;
pub mod mnemonic;
pub mod seed;
pub mod storage;

pub use lang::Language;
pub use mnemonic::Mnemonic;
pub use polyseed_crypto::kdf::{SeedKey, MAX_KEY_BYTES};
pub use polyseed_crypto::provider::{OsPrimitives, Primitives};
pub use polyseed_types::config::SeedConfig;
pub use polyseed_types::{Coin, Features, PolyseedError, Result};
pub use seed::{Polyseed, Seed};
