//! Transactional overlay ("deposit") over a ledger store
//!
//! Used when a transfer originates from contract execution: mutations are
//! staged in a stack of checkpoint frames and only reach the parent store
//! when the outermost frame commits. Nested contract calls push frames;
//! committing pops a frame into its parent, discarding drops it entirely,
//! so no partial writes leak across a failed call.

use crate::config::ChainConfig;
use crate::crypto::{address_to_hex, Address};
use crate::error::ExecutionError;
use crate::ledger::account::{Account, Amount};
use crate::ledger::store::{AssetRegistry, LedgerStore};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Default)]
struct Frame {
    accounts: HashMap<Address, Account>,
}

/// Checkpointed staging view over account and asset state.
///
/// Purely local and single-threaded; owns no persistent state.
pub struct Overlay<'a, S> {
    parent: &'a mut S,
    // Invariant: never empty; the first frame is the root staging area.
    frames: Vec<Frame>,
    gateways: HashSet<Address>,
}

impl<'a, S: LedgerStore + AssetRegistry> Overlay<'a, S> {
    pub fn new(parent: &'a mut S, gateways: HashSet<Address>) -> Self {
        Overlay {
            parent,
            frames: vec![Frame::default()],
            gateways,
        }
    }

    pub fn from_config(parent: &'a mut S, config: &ChainConfig) -> Self {
        let gateways = config.gateway_set();
        Self::new(parent, gateways)
    }

    /// Number of open frames, the root frame included.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Reads through the frame stack top-down, then the parent store.
    pub fn get_account(&self, address: &Address) -> Option<Account> {
        for frame in self.frames.iter().rev() {
            if let Some(account) = frame.accounts.get(address) {
                return Some(account.clone());
            }
        }
        self.parent.get_account(address)
    }

    /// Stages an account write in the top frame.
    pub fn put_account(&mut self, account: Account) {
        if let Some(frame) = self.frames.last_mut() {
            frame.accounts.insert(account.address, account);
        }
    }

    /// Opens a nested frame for a recursive contract call.
    pub fn checkpoint(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pops the top frame into its parent; the outermost commit flushes the
    /// staged writes into the parent store.
    pub fn commit(&mut self) {
        let top = match self.frames.pop() {
            Some(frame) => frame,
            None => return,
        };
        match self.frames.last_mut() {
            Some(below) => below.accounts.extend(top.accounts),
            None => {
                for account in top.accounts.into_values() {
                    self.parent.put_account(account);
                }
                self.frames.push(Frame::default());
            }
        }
    }

    /// Drops the top frame and every mutation staged in it.
    pub fn discard(&mut self) {
        self.frames.pop();
        if self.frames.is_empty() {
            self.frames.push(Frame::default());
        }
    }

    /// Applies an overflow-checked signed delta to a token balance. A
    /// negative result means the debited side does not hold enough.
    pub fn adjust_token_balance(
        &mut self,
        address: &Address,
        asset_id: &str,
        delta: Amount,
    ) -> Result<(), ExecutionError> {
        let mut account = self.get_account(address).ok_or_else(|| {
            ExecutionError::InternalInconsistency(format!(
                "no account {} for token adjustment",
                address_to_hex(address)
            ))
        })?;
        let held = account.asset_balance(asset_id);
        let updated = held.checked_add(delta).ok_or(ExecutionError::Overflow)?;
        if updated < 0 {
            return Err(ExecutionError::AssetReduceFailed);
        }
        account.assets.insert(asset_id.to_string(), updated);
        self.put_account(account);
        Ok(())
    }

    /// Whether the address holds the privileged gateway designation.
    pub fn is_gateway_address(&self, address: &Address) -> bool {
        self.gateways.contains(address)
    }

    pub fn has_asset(&self, asset_id: &str) -> bool {
        self.parent.has_asset(asset_id)
    }

    pub fn get_asset_issuer(&self, asset_id: &str) -> Option<Address> {
        self.parent.get_asset_issuer(asset_id)
    }
}
