//! Chain configuration for EmberChain
//!
//! Fee constants, the charging mode, and the gateway list are passed into
//! actuators and overlays as an explicit value at construction; nothing in
//! the core reads ambient global state.

use crate::crypto::{address_from_hex, Address};
use crate::ledger::account::Amount;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Selects whether fees and creation costs are denominated in native
/// currency or in token units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargingMode {
    #[default]
    NativeFee,
    TokenFee,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    #[serde(default)]
    pub charging_mode: ChargingMode,
    /// Base fee for a direct asset transfer.
    #[serde(default)]
    pub transfer_fee: Amount,
    #[serde(default = "default_account_creation_fee")]
    pub native_account_creation_fee: Amount,
    #[serde(default = "default_account_creation_fee")]
    pub token_account_creation_fee: Amount,
    /// Hex-encoded chain identifier mixed into side-chain signing digests.
    #[serde(default)]
    pub chain_id: String,
    #[serde(default = "default_is_main_chain")]
    pub is_main_chain: bool,
    /// Hex addresses permitted to implicitly create destination accounts
    /// during contract-internal transfers.
    #[serde(default)]
    pub gateway_addresses: Vec<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            charging_mode: ChargingMode::default(),
            transfer_fee: 0,
            native_account_creation_fee: default_account_creation_fee(),
            token_account_creation_fee: default_account_creation_fee(),
            chain_id: String::new(),
            is_main_chain: default_is_main_chain(),
            gateway_addresses: Vec::new(),
        }
    }
}

impl ChainConfig {
    /// The account-creation surcharge for the active charging mode.
    pub fn account_creation_fee(&self) -> Amount {
        match self.charging_mode {
            ChargingMode::NativeFee => self.native_account_creation_fee,
            ChargingMode::TokenFee => self.token_account_creation_fee,
        }
    }

    pub fn chain_id_bytes(&self) -> Vec<u8> {
        hex::decode(&self.chain_id).unwrap_or_default()
    }

    /// Parses the configured gateway addresses, skipping any that are not
    /// well-formed. `load_config` rejects malformed entries up front, so
    /// the skip only matters for hand-built configs.
    pub fn gateway_set(&self) -> HashSet<Address> {
        self.gateway_addresses
            .iter()
            .filter_map(|hex_addr| address_from_hex(hex_addr).ok())
            .collect()
    }
}

fn default_account_creation_fee() -> Amount {
    1_000_000
}

fn default_is_main_chain() -> bool {
    true
}

/// Loads the chain configuration from a TOML file, falling back to defaults
/// when the file is absent.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ChainConfig, Box<dyn std::error::Error>> {
    let config_str = fs::read_to_string(path).unwrap_or_default();
    let config: ChainConfig = if config_str.is_empty() {
        ChainConfig::default()
    } else {
        toml::from_str(&config_str)?
    };

    // Validate critical values
    if config.transfer_fee < 0 {
        return Err("transfer_fee must not be negative".into());
    }
    if config.native_account_creation_fee < 0 || config.token_account_creation_fee < 0 {
        return Err("account creation fees must not be negative".into());
    }
    if !config.chain_id.is_empty() && hex::decode(&config.chain_id).is_err() {
        return Err("chain_id must be hex-encoded".into());
    }
    if !config.is_main_chain && config.chain_id.is_empty() {
        return Err("chain_id must be set for a side chain".into());
    }
    for hex_addr in &config.gateway_addresses {
        address_from_hex(hex_addr).map_err(|e| format!("gateway address {}: {}", hex_addr, e))?;
    }

    Ok(config)
}
