//! Error types for EmberChain

use crate::ledger::account::Amount;
use thiserror::Error;

/// Rejection reasons raised before any store mutation.
///
/// A `ValidationError` means the transaction is simply rejected; no cleanup
/// is needed because validation never writes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("amount must be greater than 0")]
    InvalidAmount,
    #[error("cannot transfer asset to yourself")]
    SelfTransfer,
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("asset not found: {0}")]
    AssetNotFound(String),
    #[error("asset balance is not sufficient")]
    InsufficientAssetBalance,
    #[error("crediting the destination would overflow its asset balance")]
    CreditOverflow,
    #[error("balance is not sufficient to cover the fee: need {need}, have {have}")]
    InsufficientFeeBalance { need: Amount, have: Amount },
    #[error("no destination account, and owner is not allowed to create one")]
    NoDestinationAccount,
    #[error("contract type error, expected [{expected}], real type [{got}]")]
    WrongContractType {
        expected: &'static str,
        got: &'static str,
    },
}

/// Failures raised after execution has started mutating the store.
///
/// The actuator does not roll back its own partial writes. The caller's
/// apply-pipeline must snapshot state before `execute` and discard all
/// writes when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("balance is not sufficient: {0}")]
    InsufficientBalance(String),
    #[error("arithmetic overflow while adjusting a balance")]
    Overflow,
    #[error("reduce asset amount failed")]
    AssetReduceFailed,
    /// Unreachable after a successful validate; signals a race or a
    /// validate/execute mismatch and must be surfaced as fatal.
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

/// Errors from the cryptographic primitives (malformed keys, signatures,
/// or addresses). During multi-signature validation these are treated as a
/// failed validation, not as a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("invalid secret key: {0}")]
    InvalidSecretKey(String),
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("signature recovery failed: {0}")]
    RecoveryFailed(String),
}
