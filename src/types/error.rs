//! Error types for the Ledger Engine
//!
//! This module defines all error types that can occur while applying
//! operations. Every variant is recoverable at the caller level: the
//! gateway maps business rejections to 400-class codes and commit
//! failures to 500-class codes, and no error kind is fatal to the
//! process.

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Main error type for the ledger engine
///
/// Each variant carries enough context to diagnose the rejection without
/// consulting the store. Rejections have zero side effects: no balance
/// change, no transaction record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Requested amount was zero or negative
    #[error("Invalid amount {amount}: must be strictly positive")]
    InvalidAmount {
        /// The offending amount
        amount: Decimal,
    },

    /// Referenced account does not exist
    #[error("Account {account_number} not found")]
    AccountNotFound {
        /// The missing account number
        account_number: String,
    },

    /// Requester does not own the account and holds no role that permits
    /// the operation
    #[error("Requester {user_id} may not operate on account {account_number}")]
    Forbidden {
        /// Account the requester tried to operate on
        account_number: String,
        /// The requester's user id
        user_id: String,
    },

    /// Account is locked and rejects all balance-affecting operations
    #[error("Account {account_number} is locked")]
    AccountLocked {
        /// The locked account number
        account_number: String,
    },

    /// Sender's available funds do not cover the requested amount
    #[error(
        "Insufficient funds on {account_number}: available {available}, requested {requested}"
    )]
    InsufficientFunds {
        /// Sender account number
        account_number: String,
        /// Available funds (balance plus any overdraft allowance)
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// Two-account kind submitted without a receiver account number
    #[error("{kind} requires a receiver account")]
    ReceiverRequired {
        /// Wire name of the operation kind
        kind: String,
    },

    /// Sender and receiver are the same account
    #[error("Account {account_number} cannot transfer to itself")]
    SelfTransfer {
        /// The account number used on both sides
        account_number: String,
    },

    /// Checked balance arithmetic would overflow
    #[error("Arithmetic overflow in {operation} on account {account_number}")]
    Overflow {
        /// Operation that would overflow
        operation: String,
        /// Affected account number
        account_number: String,
    },

    /// Enrollment attempted with an account number already in use
    #[error("Account {account_number} already exists")]
    AccountExists {
        /// The duplicate account number
        account_number: String,
    },

    /// A record with this idempotency key was already committed
    #[error("Request {request_id} was already applied")]
    DuplicateRequest {
        /// The duplicate idempotency key
        request_id: Uuid,
    },

    /// Commit could not be applied: version-conflict retries were
    /// exhausted or the storage layer failed
    ///
    /// State is exactly as if the operation never started. The engine
    /// does not retry past this point; resubmission is the caller's
    /// decision, ideally carrying an idempotency key.
    #[error("Commit failed: {reason}")]
    CommitFailed {
        /// What went wrong
        reason: String,
    },

    /// Referenced transaction record does not exist
    #[error("Transaction {id} not found")]
    TransactionNotFound {
        /// The missing transaction id
        id: Uuid,
    },
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account_number: &str) -> Self {
        LedgerError::AccountNotFound {
            account_number: account_number.to_string(),
        }
    }

    /// Create a Forbidden error
    pub fn forbidden(account_number: &str, user_id: &str) -> Self {
        LedgerError::Forbidden {
            account_number: account_number.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// Create an AccountLocked error
    pub fn account_locked(account_number: &str) -> Self {
        LedgerError::AccountLocked {
            account_number: account_number.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account_number: &str, available: Decimal, requested: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account_number: account_number.to_string(),
            available,
            requested,
        }
    }

    /// Create a ReceiverRequired error
    pub fn receiver_required(kind: &str) -> Self {
        LedgerError::ReceiverRequired {
            kind: kind.to_string(),
        }
    }

    /// Create a SelfTransfer error
    pub fn self_transfer(account_number: &str) -> Self {
        LedgerError::SelfTransfer {
            account_number: account_number.to_string(),
        }
    }

    /// Create an Overflow error
    pub fn overflow(operation: &str, account_number: &str) -> Self {
        LedgerError::Overflow {
            operation: operation.to_string(),
            account_number: account_number.to_string(),
        }
    }

    /// Create an AccountExists error
    pub fn account_exists(account_number: &str) -> Self {
        LedgerError::AccountExists {
            account_number: account_number.to_string(),
        }
    }

    /// Create a DuplicateRequest error
    pub fn duplicate_request(request_id: Uuid) -> Self {
        LedgerError::DuplicateRequest { request_id }
    }

    /// Create a CommitFailed error
    pub fn commit_failed(reason: impl Into<String>) -> Self {
        LedgerError::CommitFailed {
            reason: reason.into(),
        }
    }

    /// Create a TransactionNotFound error
    pub fn transaction_not_found(id: Uuid) -> Self {
        LedgerError::TransactionNotFound { id }
    }
}
