/// Direct asset transfer against the ledger store.
use crate::actuator::{Actuator, Receipt, ReceiptStatus};
use crate::config::ChainConfig;
use crate::crypto::{address_to_hex, address_valid, Address};
use crate::error::{ExecutionError, ValidationError};
use crate::ledger::account::{Account, AccountKind, Amount};
use crate::ledger::store::{AssetRegistry, LedgerStore};
use crate::transaction::types::{Contract, ContractPayload, TransferAssetContract};
use tracing::debug;

pub struct TransferAssetActuator {
    contract: TransferAssetContract,
    config: ChainConfig,
}

impl TransferAssetActuator {
    /// Builds the actuator from a generic contract, rejecting any other
    /// contract kind.
    pub fn new(contract: &Contract, config: ChainConfig) -> Result<Self, ValidationError> {
        match &contract.payload {
            ContractPayload::TransferAsset(c) => Ok(TransferAssetActuator {
                contract: c.clone(),
                config,
            }),
            other => Err(ValidationError::WrongContractType {
                expected: "TransferAssetContract",
                got: other.kind(),
            }),
        }
    }

    pub fn from_parts(contract: TransferAssetContract, config: ChainConfig) -> Self {
        TransferAssetActuator { contract, config }
    }

    fn apply<S: LedgerStore + AssetRegistry>(
        &self,
        store: &mut S,
        fee: &mut Amount,
    ) -> Result<(), ExecutionError> {
        let c = &self.contract;

        let mut to_account = match store.get_account(&c.to_address) {
            Some(account) => account,
            None => {
                let account = Account::new(c.to_address, AccountKind::Normal);
                store.put_account(account.clone());
                *fee = fee.saturating_add(self.config.account_creation_fee());
                account
            }
        };

        let mut owner_account = fetch_account(store, &c.owner_address)?;
        owner_account.adjust_balance(-*fee)?;
        store.put_account(owner_account);

        let blackhole_address = store.blackhole_address();
        let mut blackhole = store
            .get_account(&blackhole_address)
            .unwrap_or_else(|| Account::new(blackhole_address, AccountKind::Normal));
        blackhole.adjust_balance(*fee)?;
        store.put_account(blackhole);

        let mut owner_account = fetch_account(store, &c.owner_address)?;
        if !owner_account.reduce_asset_amount(&c.asset_id, c.amount) {
            return Err(ExecutionError::AssetReduceFailed);
        }
        store.put_account(owner_account);

        to_account.add_asset_amount(&c.asset_id, c.amount)?;
        store.put_account(to_account);

        Ok(())
    }
}

fn fetch_account<S: LedgerStore>(store: &S, address: &Address) -> Result<Account, ExecutionError> {
    store.get_account(address).ok_or_else(|| {
        ExecutionError::InternalInconsistency(format!(
            "account {} missing at execute",
            address_to_hex(address)
        ))
    })
}

impl<S: LedgerStore + AssetRegistry> Actuator<S> for TransferAssetActuator {
    fn validate(&self, store: &S) -> Result<(), ValidationError> {
        let c = &self.contract;

        if !address_valid(&c.owner_address) {
            return Err(ValidationError::InvalidAddress(
                "invalid owner address".to_string(),
            ));
        }
        if !address_valid(&c.to_address) {
            return Err(ValidationError::InvalidAddress(
                "invalid to address".to_string(),
            ));
        }
        if c.amount <= 0 {
            return Err(ValidationError::InvalidAmount);
        }
        if c.owner_address == c.to_address {
            return Err(ValidationError::SelfTransfer);
        }

        let owner_account = store
            .get_account(&c.owner_address)
            .ok_or_else(|| ValidationError::AccountNotFound(address_to_hex(&c.owner_address)))?;

        if !store.has_asset(&c.asset_id) {
            return Err(ValidationError::AssetNotFound(c.asset_id.clone()));
        }

        let held = owner_account.asset_balance(&c.asset_id);
        if held <= 0 {
            return Err(ValidationError::InsufficientAssetBalance);
        }
        if c.amount > held {
            return Err(ValidationError::InsufficientAssetBalance);
        }

        match store.get_account(&c.to_address) {
            Some(to_account) => {
                // Only an existing holding can overflow; first credit of the
                // asset starts from zero.
                if to_account.assets.contains_key(&c.asset_id) {
                    to_account
                        .asset_balance(&c.asset_id)
                        .checked_add(c.amount)
                        .ok_or(ValidationError::CreditOverflow)?;
                }
            }
            None => {
                let need = <Self as Actuator<S>>::calc_fee(self)
                    .saturating_add(self.config.account_creation_fee());
                if owner_account.balance < need {
                    return Err(ValidationError::InsufficientFeeBalance {
                        need,
                        have: owner_account.balance,
                    });
                }
            }
        }

        Ok(())
    }

    fn execute(&self, store: &mut S, result: &mut Receipt) -> Result<(), ExecutionError> {
        let mut fee = <Self as Actuator<S>>::calc_fee(self);
        match self.apply(store, &mut fee) {
            Ok(()) => {
                result.set_status(fee, ReceiptStatus::Success);
                Ok(())
            }
            Err(e) => {
                debug!("transfer execute failed: {}", e);
                result.set_status(fee, ReceiptStatus::Failed);
                Err(e)
            }
        }
    }

    fn calc_fee(&self) -> Amount {
        self.config.transfer_fee
    }
}
