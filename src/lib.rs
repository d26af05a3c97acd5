//! Ledger Engine Library
//! # Overview
//!
//! This library provides a balance-mutation engine for a small banking
//! service: enrolled bank accounts, money-movement operations, and an
//! append-only transaction log over a versioned account store.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Account, OperationRequest, TransactionRecord, etc.)
//! - [`core`] - Business logic components:
//!   - [`core::traits`] - Store and log abstractions plus the atomic commit contract
//!   - [`core::engine`] - The balance mutation engine (read-validate-commit)
//!   - [`core::memory_store`] - In-memory versioned store and transaction log
//! - [`gateway`] - The already-authenticated boundary that maps requests onto
//!   the engine and translates errors to stable codes
//! - [`cli`] - Arguments for the concurrency soak driver binary
//!
//! # Operations
//!
//! The engine supports four money-movement kinds:
//!
//! - **CASH_IN**: Credit funds to an account from an external source
//! - **CASH_OUT**: Debit funds from an account (requires sufficient funds)
//! - **FUND_TRANSFER**: Move funds between two accounts
//! - **PAY_BILLS**: Pay a biller; balance-wise identical to a transfer
//!
//! # Atomicity
//!
//! Every operation is applied as one atomic unit: the balance write(s)
//! and the transaction-record append either all happen or none do.
//! Commits are optimistic; a version conflict triggers a bounded
//! re-read-and-retry cycle, and no lock is held across a store round
//! trip. Operations touching the same account are serializable, and
//! two-account commits acquire accounts in lexicographic order so that
//! opposing transfers cannot deadlock.

// Module declarations
pub mod cli;
pub mod core;
pub mod gateway;
pub mod types;

pub use crate::core::{
    AccountHandle, AccountStore, AccountUpdate, CommitError, EngineConfig, LedgerEngine,
    MemoryStore, TransactionLog,
};
pub use gateway::{ApiError, EnrollmentRequest, ErrorCode, OperationGateway, OperationResponse};
pub use types::{
    Account, AccountKind, AccountNumber, LedgerError, OperationKind, OperationRequest, RequestId,
    Requester, Role, TransactionId, TransactionRecord, UserId,
};
