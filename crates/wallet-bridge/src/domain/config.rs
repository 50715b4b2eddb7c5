//! Bridge configuration with validation.
//!
//! Loaded from TOML; every section has defaults so an empty file is valid.
//!
//! ```toml
//! [signing]
//! origin = "chrome-extension://wallet"
//!
//! [timeouts]
//! default = "30s"
//! cleanup_interval = "5s"
//!
//! [wallet]
//! name = "Sui Wallet"
//! chains = ["sui:devnet", "sui:localnet"]
//!
//! [legacy]
//! enabled = true
//! slot = "suiWallet"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default identity of the privileged signing context.
pub const DEFAULT_SIGNING_ORIGIN: &str = "chrome-extension://sui-wallet";

/// Fixed global slot used by the deprecated interface.
pub const DEFAULT_LEGACY_SLOT: &str = "suiWallet";

const DEFAULT_WALLET_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB4bWxucz0iaHR0cDovL3d3dy53My5vcmcvMjAwMC9zdmciIHZpZXdCb3g9IjAgMCAxIDEiLz4=";

/// Main bridge configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Privileged side identity
    pub signing: SigningContextConfig,
    /// Wait bounds
    pub timeouts: TimeoutConfig,
    /// Standardized wallet metadata
    pub wallet: WalletConfig,
    /// Deprecated interface
    pub legacy: LegacyConfig,
    /// Logging
    pub telemetry: TelemetryConfig,
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signing.origin.trim().is_empty() {
            return Err(ConfigError::MissingValue("signing.origin"));
        }

        if self.timeouts.default.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "default timeout cannot be 0".into(),
            ));
        }

        if self.timeouts.cleanup_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "cleanup interval cannot be 0".into(),
            ));
        }

        if self.wallet.name.trim().is_empty() {
            return Err(ConfigError::MissingValue("wallet.name"));
        }

        if self.wallet.chains.is_empty() {
            return Err(ConfigError::MissingValue("wallet.chains"));
        }

        if self.legacy.enabled && self.legacy.slot.trim().is_empty() {
            return Err(ConfigError::MissingValue("legacy.slot"));
        }

        Ok(())
    }
}

/// Signing context identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningContextConfig {
    /// Origin every inbound response must carry
    pub origin: String,
}

impl Default for SigningContextConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_SIGNING_ORIGIN.to_string(),
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Wait bound for capabilities without their own
    #[serde(with = "humantime_serde")]
    pub default: Duration,
    /// How often abandoned entries are swept from the pending table
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            default: Duration::from_secs(30),
            cleanup_interval: Duration::from_secs(5),
        }
    }
}

/// Wallet registration metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub name: String,
    /// Data URL
    pub icon: String,
    /// Chain identifiers, e.g. "sui:devnet"
    pub chains: Vec<String>,
    pub version: String,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            name: "Sui Wallet".to_string(),
            icon: DEFAULT_WALLET_ICON.to_string(),
            chains: vec![
                "sui:devnet".to_string(),
                "sui:testnet".to_string(),
                "sui:localnet".to_string(),
            ],
            version: "1.0.0".to_string(),
        }
    }
}

/// Deprecated interface configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyConfig {
    /// Attach the deprecated interface at all
    pub enabled: bool,
    /// Global slot name
    pub slot: String,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slot: DEFAULT_LEGACY_SLOT.to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Filter used when RUST_LOG is unset
    pub log_level: String,
    /// JSON output instead of pretty
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },
    #[error("failed to parse configuration: {0}")]
    Parse(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
