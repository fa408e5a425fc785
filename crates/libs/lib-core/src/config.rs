//! # Widget Configuration
//!
//! This module holds the static configuration of the widget: which chains it is
//! willing to operate on, which token contract it talks to, and how long it waits
//! for transactions to be included. All configuration is validated on startup to
//! fail fast if misconfigured.
//!
//! ## Global Config Access
//!
//! Use [`core_config()`] to access the global configuration instance:
//!
//! ```rust,no_run
//! use lib_core::config::core_config;
//!
//! let config = core_config();
//! let supported = config.supported_chains.contains(56);
//! ```
//!
//! The config must be initialized once at application startup using [`init_config()`].
//!
//! ## Overrides
//!
//! The browser build has no process environment, so [`Config::from_env`] reads
//! variables captured at *build* time with `option_env!`:
//!
//! | Variable | Field |
//! |---|---|
//! | `WALLET_SUPPORTED_CHAINS` | comma separated chain ids |
//! | `WALLET_SWITCH_CHAIN` | chain id requested when the wallet is elsewhere |
//! | `WALLET_TOKEN_ADDRESS` | token contract address |
//! | `WALLET_INCLUSION_TIMEOUT_SECS` | seconds to wait for a receipt |

use std::str::FromStr;
use std::sync::OnceLock;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::{Result, WalletError};

/// Well-known chain identifiers.
pub mod chains {
    pub const ETHEREUM: u64 = 1;
    pub const BSC: u64 = 56;
    pub const BSC_TESTNET: u64 = 97;
}

/// BabyDoge token on BNB Smart Chain.
pub const DEFAULT_TOKEN_ADDRESS: Address = address!("0xc748673057861a797275CD8A068AbB95A902e8de");

/// Immutable allow-list of chain ids, in configuration order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u64>", into = "Vec<u64>")]
pub struct SupportedChains(Vec<u64>);

impl SupportedChains {
    pub fn new(ids: impl IntoIterator<Item = u64>) -> Self {
        let mut out: Vec<u64> = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self(out)
    }

    pub fn contains(&self, chain_id: u64) -> bool {
        self.0.contains(&chain_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SupportedChains {
    fn default() -> Self {
        Self::new([chains::ETHEREUM, chains::BSC, chains::BSC_TESTNET])
    }
}

impl From<Vec<u64>> for SupportedChains {
    fn from(ids: Vec<u64>) -> Self {
        Self::new(ids)
    }
}

impl From<SupportedChains> for Vec<u64> {
    fn from(chains: SupportedChains) -> Self {
        chains.0
    }
}

impl FromStr for SupportedChains {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        let ids = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|e| WalletError::Config(format!("invalid chain id '{}': {}", part, e)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(ids))
    }
}

/// Token contract the widget displays and transfers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_TOKEN_ADDRESS,
            symbol: "BabyDoge".to_string(),
            decimals: 18,
        }
    }
}

/// Widget configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chains the widget operates on.
    pub supported_chains: SupportedChains,

    /// Chain requested via `wallet_switchEthereumChain` when the wallet is on an
    /// unsupported chain. Must be a member of `supported_chains`.
    pub switch_chain_id: u64,

    pub token: TokenConfig,

    /// Spender passed to `approve` before a token transfer.
    ///
    /// `None` approves the token contract itself.
    pub approve_spender: Option<Address>,

    pub native_symbol: String,

    /// Seconds to wait for a submitted transaction to be included.
    pub inclusion_timeout_secs: u64,

    /// Interval between receipt polls in the browser binding.
    pub receipt_poll_interval_ms: u64,

    /// Fixed decimal places for balance display.
    pub display_decimals: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            supported_chains: SupportedChains::default(),
            switch_chain_id: chains::BSC,
            token: TokenConfig::default(),
            approve_spender: None,
            native_symbol: "BNB".to_string(),
            inclusion_timeout_secs: 120,
            receipt_poll_interval_ms: 1_500,
            display_decimals: 5,
        }
    }
}

impl Config {
    /// Load configuration from build-time environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| {
            let value = match key {
                "WALLET_SUPPORTED_CHAINS" => option_env!("WALLET_SUPPORTED_CHAINS"),
                "WALLET_SWITCH_CHAIN" => option_env!("WALLET_SWITCH_CHAIN"),
                "WALLET_TOKEN_ADDRESS" => option_env!("WALLET_TOKEN_ADDRESS"),
                "WALLET_INCLUSION_TIMEOUT_SECS" => option_env!("WALLET_INCLUSION_TIMEOUT_SECS"),
                _ => None,
            };
            value.map(str::to_string)
        })
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(chains) = lookup("WALLET_SUPPORTED_CHAINS") {
            config.supported_chains = chains.parse()?;
        }

        if let Some(switch) = lookup("WALLET_SWITCH_CHAIN") {
            config.switch_chain_id = switch
                .trim()
                .parse()
                .map_err(|e| WalletError::Config(format!("WALLET_SWITCH_CHAIN must be a chain id: {}", e)))?;
        }

        if let Some(token) = lookup("WALLET_TOKEN_ADDRESS") {
            config.token.address = Address::from_str(token.trim())
                .map_err(|e| WalletError::Config(format!("WALLET_TOKEN_ADDRESS is not an address: {}", e)))?;
        }

        if let Some(timeout) = lookup("WALLET_INCLUSION_TIMEOUT_SECS") {
            config.inclusion_timeout_secs = timeout.trim().parse().map_err(|e| {
                WalletError::Config(format!("WALLET_INCLUSION_TIMEOUT_SECS must be a valid number: {}", e))
            })?;
        }

        Ok(config)
    }

    /// Parse a JSON configuration document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.supported_chains.is_empty() {
            return Err(WalletError::Config("at least one supported chain is required".to_string()));
        }

        if !self.supported_chains.contains(self.switch_chain_id) {
            return Err(WalletError::Config(format!(
                "switch chain {} is not in the supported chain set",
                self.switch_chain_id
            )));
        }

        if self.inclusion_timeout_secs == 0 || self.receipt_poll_interval_ms == 0 {
            return Err(WalletError::Config("timeouts must be non-zero".to_string()));
        }

        Ok(())
    }

    /// Spender passed to the token `approve` call.
    pub fn spender(&self) -> Address {
        self.approve_spender.unwrap_or(self.token.address)
    }
}

/// Global configuration instance (initialized once at startup).
static CONFIG: OnceLock<Config> = OnceLock::new();

/// Initialize the global configuration.
///
/// # Errors
///
/// Returns an error if:
/// - Build-time overrides are invalid
/// - Configuration validation fails
/// - Config has already been initialized
pub fn init_config() -> Result<()> {
    let config = load(Config::from_env())?;

    CONFIG
        .set(config)
        .map_err(|_| WalletError::Config("Config has already been initialized".to_string()))
}

fn load(config: Result<Config>) -> Result<Config> {
    let config = config
        .and_then(|config| config.validate().map(|()| config))
        .inspect_err(|e| error!(error = %e, "configuration rejected"))?;

    info!(
        chains = ?config.supported_chains.iter().collect::<Vec<_>>(),
        switch_chain_id = config.switch_chain_id,
        token = %config.token.address,
        "configuration loaded"
    );
    Ok(config)
}

/// Get a reference to the global configuration.
///
/// # Panics
///
/// Panics if [`init_config()`] has not been called yet.
pub fn core_config() -> &'static Config {
    CONFIG.get().expect("Config must be initialized with init_config() before use")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.supported_chains.iter().collect::<Vec<_>>(), vec![1, 56, 97]);
        assert_eq!(config.switch_chain_id, chains::BSC);
        assert_eq!(config.spender(), DEFAULT_TOKEN_ADDRESS);
    }

    #[test]
    fn test_from_vars_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("WALLET_SUPPORTED_CHAINS", "1, 97,97"),
            ("WALLET_SWITCH_CHAIN", "97"),
            ("WALLET_INCLUSION_TIMEOUT_SECS", "30"),
        ]);
        let config = Config::from_vars(|k| vars.get(k).map(|v| v.to_string())).unwrap();

        assert_eq!(config.supported_chains.len(), 2);
        assert!(!config.supported_chains.contains(56));
        assert_eq!(config.switch_chain_id, 97);
        assert_eq!(config.inclusion_timeout_secs, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_overrides() {
        assert!(Config::from_vars(|k| (k == "WALLET_SUPPORTED_CHAINS").then(|| "1,abc".to_string())).is_err());
        assert!(Config::from_vars(|k| (k == "WALLET_TOKEN_ADDRESS").then(|| "0x12".to_string())).is_err());
    }

    #[test]
    fn test_switch_target_must_be_supported() {
        let config = Config {
            supported_chains: SupportedChains::new([1]),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(WalletError::Config(_))));
    }

    #[test]
    fn test_load_validates() {
        let config = load(Config::from_json(r#"{ "supported_chains": [1], "switch_chain_id": 56 }"#));
        assert!(matches!(config, Err(WalletError::Config(_))));

        let config = load(Config::from_vars(|k| (k == "WALLET_SWITCH_CHAIN").then(|| "97".to_string()))).unwrap();
        assert_eq!(config.switch_chain_id, 97);
    }

    #[test]
    fn test_from_json_partial() {
        let config = Config::from_json(r#"{ "supported_chains": [97], "switch_chain_id": 97 }"#).unwrap();
        assert!(config.supported_chains.contains(97));
        assert_eq!(config.native_symbol, "BNB");
        assert!(config.validate().is_ok());
    }
}
