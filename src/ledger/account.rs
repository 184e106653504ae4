/// Account state for EmberChain
use crate::crypto::{address_to_hex, Address};
use crate::error::ExecutionError;
use std::collections::HashMap;

/// Balances and fees are signed 64-bit; every stored balance stays >= 0.
pub type Amount = i64;

/// Identifier of a registered asset.
pub type AssetId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum AccountKind {
    Normal,
    Contract,
    AssetIssue,
}

/// An account is created lazily on first inbound transfer and never
/// explicitly destroyed; zero balance is a valid terminal state.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Account {
    pub address: Address,
    pub kind: AccountKind,
    /// Base-currency balance.
    pub balance: Amount,
    /// Per-asset balances.
    pub assets: HashMap<AssetId, Amount>,
}

impl Account {
    pub fn new(address: Address, kind: AccountKind) -> Self {
        Account {
            address,
            kind,
            balance: 0,
            assets: HashMap::new(),
        }
    }

    /// The held amount of an asset, zero when the asset was never credited.
    pub fn asset_balance(&self, asset_id: &str) -> Amount {
        self.assets.get(asset_id).copied().unwrap_or(0)
    }

    /// Credits `amount` of an asset with checked addition.
    pub fn add_asset_amount(&mut self, asset_id: &str, amount: Amount) -> Result<(), ExecutionError> {
        if amount < 0 {
            return Err(ExecutionError::InternalInconsistency(format!(
                "negative asset credit of {} to {}",
                amount,
                address_to_hex(&self.address)
            )));
        }
        let held = self.asset_balance(asset_id);
        let updated = held.checked_add(amount).ok_or(ExecutionError::Overflow)?;
        self.assets.insert(asset_id.to_string(), updated);
        Ok(())
    }

    /// Debits `amount` of an asset. Returns false when the account does not
    /// hold enough, leaving the balance untouched.
    pub fn reduce_asset_amount(&mut self, asset_id: &str, amount: Amount) -> bool {
        if amount <= 0 {
            return false;
        }
        match self.assets.get_mut(asset_id) {
            Some(held) if *held >= amount => {
                *held -= amount;
                true
            }
            _ => false,
        }
    }

    /// Applies a signed delta to the base-currency balance. Overflow and a
    /// negative result are both rejected without mutating.
    pub fn adjust_balance(&mut self, delta: Amount) -> Result<(), ExecutionError> {
        let updated = self
            .balance
            .checked_add(delta)
            .ok_or(ExecutionError::Overflow)?;
        if updated < 0 {
            return Err(ExecutionError::InsufficientBalance(format!(
                "account {} has {}, cannot apply {}",
                address_to_hex(&self.address),
                self.balance,
                delta
            )));
        }
        self.balance = updated;
        Ok(())
    }
}
