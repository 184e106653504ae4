//! EmberChain - a ledger state-transition engine for asset transfers
//!
//! # Architecture
//!
//! The crate is organized into logical modules:
//!
//! ## State Transition
//! - [`actuator`] - Validate-then-execute units of ledger state transition
//! - [`ledger`] - Account state and the backing-store interfaces
//! - [`overlay`] - Checkpointed staging view for contract-originated transfers
//!
//! ## Transaction Integrity
//! - [`transaction`] - Transaction/contract types and the integrity layer
//!   (canonical hashing, chain-bound signing, multi-signature validation)
//!
//! ## Cryptography
//! - [`crypto`] - Hashing, signatures, and address recovery (secp256k1)
//!
//! ## Configuration & Utilities
//! - [`config`] - Chain configuration (fees, charging mode, gateways)
//! - [`error`] - Error types
//!
//! Transactions within a block are applied sequentially by an external
//! apply-loop: the engine assumes single-writer, one-transaction-at-a-time
//! semantics per ledger store, and the caller discards all mutations of a
//! failed `execute`.

#![forbid(unsafe_code)]

// ============================================================================
// State Transition
// ============================================================================
pub mod actuator;
pub mod ledger;
pub mod overlay;

// ============================================================================
// Transaction Integrity
// ============================================================================
pub mod transaction;

// ============================================================================
// Cryptography
// ============================================================================
pub mod crypto;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod config;
pub mod error;
