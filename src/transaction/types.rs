/// Transaction and contract types for EmberChain
use crate::crypto::{Address, Sha256Hash};
use crate::error::ValidationError;
use crate::ledger::account::{AccountKind, Amount, AssetId};

/// Maximum serialized transaction size in bytes (100KB) to prevent DoS
pub const MAX_TRANSACTION_SIZE: usize = 100_000;

/// How long a freshly stamped transaction stays valid.
pub const EXPIRATION_WINDOW_MS: i64 = 6 * 60 * 60 * 1000;

/// Moves `amount` of an asset from the owner to the destination.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransferAssetContract {
    pub owner_address: Address,
    pub to_address: Address,
    pub asset_id: AssetId,
    pub amount: Amount,
}

/// Registers a new asset under the issuing owner.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AssetIssueContract {
    pub owner_address: Address,
    pub asset_id: AssetId,
    pub name: String,
    pub total_supply: Amount,
}

/// Explicitly creates an account of the given kind.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccountCreateContract {
    pub owner_address: Address,
    pub account_address: Address,
    pub kind: AccountKind,
}

/// Every contract kind carries an owner address in its payload; adding a
/// kind here without extending `owner_address` is a compile error.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ContractPayload {
    TransferAsset(TransferAssetContract),
    AssetIssue(AssetIssueContract),
    AccountCreate(AccountCreateContract),
}

impl ContractPayload {
    /// Uniform owner extraction, total over all contract kinds.
    pub fn owner_address(&self) -> &Address {
        match self {
            ContractPayload::TransferAsset(c) => &c.owner_address,
            ContractPayload::AssetIssue(c) => &c.owner_address,
            ContractPayload::AccountCreate(c) => &c.owner_address,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContractPayload::TransferAsset(_) => "TransferAssetContract",
            ContractPayload::AssetIssue(_) => "AssetIssueContract",
            ContractPayload::AccountCreate(_) => "AccountCreateContract",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Contract {
    pub payload: ContractPayload,
    #[serde(default)]
    pub permission_id: i32,
}

impl Contract {
    pub fn new(payload: ContractPayload) -> Self {
        Contract {
            payload,
            permission_id: 0,
        }
    }
}

/// The signed-over payload: contracts, lifecycle timestamps, and the
/// chain-binding block reference. Signatures live outside, on
/// [`Transaction`], so they can never influence the canonical hash.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RawTransaction {
    pub contracts: Vec<Contract>,
    pub timestamp: i64,
    pub expiration: i64,
    pub ref_block_hash: Sha256Hash,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Transaction {
    pub raw: RawTransaction,
    /// Aligned positionally with `raw.contracts` once signed.
    pub signatures: Vec<Vec<u8>>,
}

impl Transaction {
    /// Builds an unsigned transaction stamped with the current time and a
    /// fresh expiration window.
    pub fn new(contracts: Vec<Contract>, ref_block_hash: Sha256Hash) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Transaction {
            raw: RawTransaction {
                contracts,
                timestamp: now,
                expiration: now + EXPIRATION_WINDOW_MS,
                ref_block_hash,
            },
            signatures: Vec::new(),
        }
    }

    /// Once any signature is present the raw payload is immutable.
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    pub fn contract_count(&self) -> usize {
        self.raw.contracts.len()
    }

    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    /// Validate transaction size to prevent DoS attacks
    pub fn validate_size(&self) -> Result<(), ValidationError> {
        let serialized = bincode::serialize(self)
            .map_err(|e| ValidationError::MalformedPayload(format!("serialization failed: {}", e)))?;

        if serialized.len() > MAX_TRANSACTION_SIZE {
            return Err(ValidationError::MalformedPayload(format!(
                "transaction too large: {} bytes (max: {})",
                serialized.len(),
                MAX_TRANSACTION_SIZE
            )));
        }
        Ok(())
    }
}
