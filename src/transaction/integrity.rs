/// Transaction integrity: canonical hashing, chain-bound signing,
/// multi-signature validation, and the mutability rules for unsigned
/// transactions.
use crate::crypto::{recover_address, sha256, KeyPair, Sha256Hash};
use crate::error::CryptoError;
use crate::transaction::types::{ContractPayload, Transaction};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Canonical hash of a transaction: computed over the raw payload only,
/// never over the signature list.
pub fn canonical_hash(tx: &Transaction) -> Sha256Hash {
    let mut hasher = Sha256::new();
    hasher.update(tx.raw.timestamp.to_le_bytes());
    hasher.update(tx.raw.expiration.to_le_bytes());
    hasher.update(tx.raw.ref_block_hash);
    for contract in &tx.raw.contracts {
        hasher.update(contract.permission_id.to_le_bytes());
        match &contract.payload {
            ContractPayload::TransferAsset(c) => {
                hasher.update("transfer_asset".as_bytes());
                hasher.update(c.owner_address);
                hasher.update(c.to_address);
                hasher.update((c.asset_id.len() as u32).to_le_bytes());
                hasher.update(c.asset_id.as_bytes());
                hasher.update(c.amount.to_le_bytes());
            }
            ContractPayload::AssetIssue(c) => {
                hasher.update("asset_issue".as_bytes());
                hasher.update(c.owner_address);
                hasher.update((c.asset_id.len() as u32).to_le_bytes());
                hasher.update(c.asset_id.as_bytes());
                hasher.update((c.name.len() as u32).to_le_bytes());
                hasher.update(c.name.as_bytes());
                hasher.update(c.total_supply.to_le_bytes());
            }
            ContractPayload::AccountCreate(c) => {
                hasher.update("account_create".as_bytes());
                hasher.update(c.owner_address);
                hasher.update(c.account_address);
                hasher.update(match c.kind {
                    crate::ledger::account::AccountKind::Normal => [0u8],
                    crate::ledger::account::AccountKind::Contract => [1u8],
                    crate::ledger::account::AccountKind::AssetIssue => [2u8],
                });
            }
        }
    }
    hasher.finalize().into()
}

/// The digest actually signed. The main chain signs the canonical hash
/// directly; a side chain hashes the chain id into it so an otherwise
/// identical transaction cannot be replayed across chains.
pub fn signing_digest(canonical: &Sha256Hash, chain_id: &[u8], is_main_chain: bool) -> Sha256Hash {
    if is_main_chain {
        *canonical
    } else {
        let mut bound = Vec::with_capacity(canonical.len() + chain_id.len());
        bound.extend_from_slice(canonical);
        bound.extend_from_slice(chain_id);
        sha256(&bound)
    }
}

/// Signs the transaction with the chain-aware digest and appends the
/// signature. One signature per contract; signing order must follow
/// contract order.
pub fn sign(
    tx: &mut Transaction,
    keypair: &KeyPair,
    chain_id: &[u8],
    is_main_chain: bool,
) -> Result<(), CryptoError> {
    let canonical = canonical_hash(tx);
    let digest = signing_digest(&canonical, chain_id, is_main_chain);
    let signature = keypair.sign_digest(&digest)?;
    tx.signatures.push(signature.to_vec());
    Ok(())
}

/// Validates every signature against the declared owner of the contract at
/// the same index. All-or-nothing: a count mismatch, an empty signature
/// list, a malformed signature, or any recovered-signer mismatch
/// invalidates the whole transaction.
///
/// Recovery uses the same chain-aware digest the signer used.
pub fn validate_signatures(tx: &Transaction, chain_id: &[u8], is_main_chain: bool) -> bool {
    if tx.signature_count() != tx.contract_count() {
        return false;
    }
    if tx.signature_count() == 0 {
        return false;
    }

    let canonical = canonical_hash(tx);
    let digest = signing_digest(&canonical, chain_id, is_main_chain);

    for (contract, signature) in tx.raw.contracts.iter().zip(&tx.signatures) {
        let recovered = match recover_address(&digest, signature) {
            Ok(address) => address,
            Err(e) => {
                debug!("signature recovery failed: {}", e);
                return false;
            }
        };
        if &recovered != contract.payload.owner_address() {
            return false;
        }
    }
    true
}

/// Sets the timestamp; a no-op once any signature is present.
pub fn set_timestamp(tx: &mut Transaction, timestamp: i64) {
    if tx.is_signed() {
        return;
    }
    tx.raw.timestamp = timestamp;
}

/// Sets the expiration; a no-op once any signature is present.
pub fn set_expiration(tx: &mut Transaction, expiration: i64) {
    if tx.is_signed() {
        return;
    }
    tx.raw.expiration = expiration;
}

/// Sets the permission id of the contract at `index`; a no-op once any
/// signature is present or when the index is out of range.
pub fn set_permission_id(tx: &mut Transaction, index: usize, permission_id: i32) {
    if tx.is_signed() {
        return;
    }
    if let Some(contract) = tx.raw.contracts.get_mut(index) {
        contract.permission_id = permission_id;
    }
}
