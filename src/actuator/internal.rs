/// Contract-internal asset transfer, evaluated against the overlay.
///
/// Triggered from within contract execution rather than as a top-level
/// transfer. No fee is charged here; the enclosing contract's resource
/// accounting covers it. Destination accounts may only be created
/// implicitly when the owner holds the gateway designation.
use crate::crypto::{address_to_hex, address_valid, Address};
use crate::error::{ExecutionError, ValidationError};
use crate::ledger::account::{Account, AccountKind, Amount, AssetId};
use crate::ledger::store::{AssetRegistry, LedgerStore};
use crate::overlay::Overlay;
use tracing::debug;

pub struct InternalTransferActuator {
    owner_address: Address,
    to_address: Address,
    asset_id: AssetId,
    amount: Amount,
}

/// Token ids arriving from contract execution may carry leading zeroes;
/// balances are keyed by the normalized form.
fn normalize_token_id(token_id: &str) -> AssetId {
    let stripped = token_id.trim_start_matches('0');
    if stripped.is_empty() && !token_id.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

impl InternalTransferActuator {
    pub fn new(owner_address: Address, to_address: Address, token_id: &str, amount: Amount) -> Self {
        InternalTransferActuator {
            owner_address,
            to_address,
            asset_id: normalize_token_id(token_id),
            amount,
        }
    }

    pub fn calc_fee(&self) -> Amount {
        0
    }

    /// Same precondition chain as the direct transfer, read through the
    /// overlay; a missing destination is only tolerated for gateway owners.
    pub fn validate<S: LedgerStore + AssetRegistry>(
        &self,
        overlay: &Overlay<'_, S>,
    ) -> Result<(), ValidationError> {
        if !address_valid(&self.owner_address) {
            return Err(ValidationError::InvalidAddress(
                "invalid owner address".to_string(),
            ));
        }
        if !address_valid(&self.to_address) {
            return Err(ValidationError::InvalidAddress(
                "invalid to address".to_string(),
            ));
        }
        if self.amount <= 0 {
            return Err(ValidationError::InvalidAmount);
        }
        if self.owner_address == self.to_address {
            return Err(ValidationError::SelfTransfer);
        }

        let owner_account = overlay
            .get_account(&self.owner_address)
            .ok_or_else(|| ValidationError::AccountNotFound(address_to_hex(&self.owner_address)))?;

        if overlay.get_asset_issuer(&self.asset_id).is_none() {
            return Err(ValidationError::AssetNotFound(self.asset_id.clone()));
        }

        let held = owner_account.asset_balance(&self.asset_id);
        if held <= 0 {
            return Err(ValidationError::InsufficientAssetBalance);
        }
        if self.amount > held {
            return Err(ValidationError::InsufficientAssetBalance);
        }

        match overlay.get_account(&self.to_address) {
            Some(to_account) => {
                if to_account.assets.contains_key(&self.asset_id) {
                    to_account
                        .asset_balance(&self.asset_id)
                        .checked_add(self.amount)
                        .ok_or(ValidationError::CreditOverflow)?;
                }
            }
            None => {
                // Only a gateway may implicitly create accounts here.
                if !overlay.is_gateway_address(&self.owner_address) {
                    return Err(ValidationError::NoDestinationAccount);
                }
            }
        }

        Ok(())
    }

    /// Applies the signed deltas through the overlay's checked token
    /// adjustment. The overlay's surrounding frame is committed or
    /// discarded by the caller.
    pub fn execute<S: LedgerStore + AssetRegistry>(
        &self,
        overlay: &mut Overlay<'_, S>,
    ) -> Result<(), ExecutionError> {
        if overlay.get_account(&self.to_address).is_none() {
            if overlay.is_gateway_address(&self.owner_address) {
                overlay.put_account(Account::new(self.to_address, AccountKind::Normal));
            } else {
                debug!(
                    "internal transfer to missing account {} by non-gateway owner",
                    address_to_hex(&self.to_address)
                );
                return Err(ExecutionError::InternalInconsistency(
                    "no destination account, and not allowed to create one here".to_string(),
                ));
            }
        }

        overlay.adjust_token_balance(&self.to_address, &self.asset_id, self.amount)?;
        overlay.adjust_token_balance(&self.owner_address, &self.asset_id, -self.amount)?;
        Ok(())
    }
}
