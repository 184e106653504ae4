//! Actuator framework: validate-then-execute units of ledger state
//! transition, one per contract kind.
//!
//! `validate` is pure and may be called freely; `execute` mutates the
//! target store and may only run after `validate` succeeded. The receipt
//! records the fee charged even when execution fails partway, and the
//! caller is responsible for discarding every mutation of a failed
//! execute (the actuator does not self-rollback).

pub mod internal;
pub mod transfer;

pub use internal::InternalTransferActuator;
pub use transfer::TransferAssetActuator;

use crate::error::{ExecutionError, ValidationError};
use crate::ledger::account::Amount;
use crate::ledger::store::{AssetRegistry, LedgerStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Failed,
}

/// Outcome record of one executed contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub fee_charged: Amount,
    pub status: ReceiptStatus,
}

impl Receipt {
    pub fn new() -> Self {
        Receipt {
            fee_charged: 0,
            status: ReceiptStatus::Success,
        }
    }

    pub fn set_status(&mut self, fee_charged: Amount, status: ReceiptStatus) {
        self.fee_charged = fee_charged;
        self.status = status;
    }
}

impl Default for Receipt {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Actuator<S: LedgerStore + AssetRegistry> {
    /// Read-only precondition checks; must not mutate any store.
    fn validate(&self, store: &S) -> Result<(), ValidationError>;

    /// Applies the state transition. Only invoked after `validate`
    /// succeeded. The execute-time fee is authoritative: the
    /// account-creation surcharge is only known once destination existence
    /// is re-checked here.
    fn execute(&self, store: &mut S, result: &mut Receipt) -> Result<(), ExecutionError>;

    /// Fee estimate hook; may differ from the execute-time fee recorded in
    /// the receipt.
    fn calc_fee(&self) -> Amount;
}
