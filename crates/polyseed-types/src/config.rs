//! Seed creation configuration.
//!
//! Feature negotiation is explicit: callers build a [`SeedConfig`] at
//! startup and pass it into the seed context. Nothing here is global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Features, PolyseedError, Result};

/// Configuration consulted when new seeds are created.
///
/// Only `enabled_features` gates behavior: a new seed may set a user
/// feature bit only if it is enabled here. Decoding and loading never
/// consult the configuration, so seeds carrying unknown features still
/// round-trip unchanged.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Bitmask of user features new seeds may carry (bits `0..=2`).
    #[serde(default)]
    pub enabled_features: u8,
}

impl SeedConfig {
    /// Creates a configuration with the given user features enabled.
    pub fn with_features(mask: u8) -> Result<Self> {
        let mut config = Self::default();
        config.enable_features(mask)?;
        Ok(config)
    }

    /// Enables the user features in `mask`, replacing the previous set.
    ///
    /// Returns the number of enabled features.
    pub fn enable_features(&mut self, mask: u8) -> Result<u32> {
        let candidate = Self {
            enabled_features: mask,
        };
        candidate.validate()?;
        self.enabled_features = mask;
        Ok(mask.count_ones())
    }

    /// Returns `true` if every bit of `features` may be set on a new seed.
    pub fn allows(&self, features: Features) -> bool {
        features.bits() & !self.enabled_features == 0
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.enabled_features & !Features::USER_MASK != 0 {
            return Err(PolyseedError::ConfigError {
                reason: format!(
                    "enabled_features {:#04x} has bits outside the user mask {:#04x}",
                    self.enabled_features,
                    Features::USER_MASK
                ),
            });
        }
        Ok(())
    }

    /// Loads and validates a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| PolyseedError::ConfigError {
            reason: format!("failed to read config file {}: {e}", path.display()),
        })?;
        let config: Self = serde_json::from_str(&data).map_err(|e| PolyseedError::ConfigError {
            reason: format!("failed to parse config file {}: {e}", path.display()),
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = SeedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.enabled_features, 0);
    }

    #[test]
    fn enable_features_counts_bits() -> std::result::Result<(), PolyseedError> {
        let mut config = SeedConfig::default();
        assert_eq!(config.enable_features(0b011)?, 2);
        assert_eq!(config.enabled_features, 0b011);
        assert_eq!(config.enable_features(0)?, 0);
        Ok(())
    }

    #[test]
    fn reserved_bit_rejected() {
        let mut config = SeedConfig::default();
        assert!(config.enable_features(0b1000).is_err());
        // Failed call leaves the previous mask in place.
        assert_eq!(config.enabled_features, 0);
    }

    #[test]
    fn out_of_field_bits_rejected() {
        let config = SeedConfig {
            enabled_features: 0x10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn allows_checks_subset() -> std::result::Result<(), PolyseedError> {
        let config = SeedConfig::with_features(0b101)?;
        assert!(config.allows(Features::from_bits_truncate(0b001)));
        assert!(config.allows(Features::from_bits_truncate(0b101)));
        assert!(!config.allows(Features::from_bits_truncate(0b010)));
        assert!(config.allows(Features::NONE));
        Ok(())
    }

    #[test]
    fn config_serde_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let config = SeedConfig::with_features(0b110)?;
        let json = serde_json::to_string(&config)?;
        let parsed: SeedConfig = serde_json::from_str(&json)?;
        assert_eq!(config, parsed);
        Ok(())
    }

    #[test]
    fn missing_field_defaults_to_zero() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let parsed: SeedConfig = serde_json::from_str("{}")?;
        assert_eq!(parsed.enabled_features, 0);
        Ok(())
    }

    #[test]
    fn load_rejects_missing_file() {
        let path = std::env::temp_dir().join(format!(
            "polyseed_missing_config_{}.json",
            std::process::id()
        ));
        assert!(SeedConfig::load(&path).is_err());
    }
}
