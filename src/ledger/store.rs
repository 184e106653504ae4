/// Store interfaces consumed by the actuators, plus an in-process
/// implementation used by tests and embedders without a database.
use crate::crypto::Address;
use crate::ledger::account::{Account, AccountKind, AssetId};
use std::collections::HashMap;

/// Account lookup and mutation contract implemented by the backing store.
pub trait LedgerStore {
    fn get_account(&self, address: &Address) -> Option<Account>;
    fn put_account(&mut self, account: Account);
    /// The fee-sink account; only ever credited by transfer logic.
    fn blackhole_address(&self) -> Address;
}

/// Read-only registry of issued assets; existence is a precondition for any
/// transfer.
pub trait AssetRegistry {
    fn has_asset(&self, asset_id: &str) -> bool;
    fn get_asset_issuer(&self, asset_id: &str) -> Option<Address>;
}

/// Registry entry for one issued asset.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetIssueEntry {
    pub asset_id: AssetId,
    pub issuer: Address,
}

/// In-memory ledger backing store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    accounts: HashMap<Address, Account>,
    assets: HashMap<AssetId, AssetIssueEntry>,
    blackhole: Address,
}

impl InMemoryLedger {
    pub fn new(blackhole: Address) -> Self {
        let mut ledger = InMemoryLedger {
            accounts: HashMap::new(),
            assets: HashMap::new(),
            blackhole,
        };
        ledger.put_account(Account::new(blackhole, AccountKind::Normal));
        ledger
    }

    pub fn register_asset(&mut self, asset_id: &str, issuer: Address) {
        self.assets.insert(
            asset_id.to_string(),
            AssetIssueEntry {
                asset_id: asset_id.to_string(),
                issuer,
            },
        );
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl LedgerStore for InMemoryLedger {
    fn get_account(&self, address: &Address) -> Option<Account> {
        self.accounts.get(address).cloned()
    }

    fn put_account(&mut self, account: Account) {
        self.accounts.insert(account.address, account);
    }

    fn blackhole_address(&self) -> Address {
        self.blackhole
    }
}

impl AssetRegistry for InMemoryLedger {
    fn has_asset(&self, asset_id: &str) -> bool {
        self.assets.contains_key(asset_id)
    }

    fn get_asset_issuer(&self, asset_id: &str) -> Option<Address> {
        self.assets.get(asset_id).map(|entry| entry.issuer)
    }
}
