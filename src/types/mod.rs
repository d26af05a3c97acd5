//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account-related types
//! - `transaction`: Operation requests, kinds, and transaction records
//! - `error`: Error types for the ledger engine

pub mod account;
pub mod error;
pub mod transaction;

pub use account::{Account, AccountKind, AccountNumber, UserId};
pub use error::LedgerError;
pub use transaction::{
    OperationKind, OperationRequest, RequestId, Requester, Role, TransactionId, TransactionRecord,
};
