//! Core traits for account storage, the transaction log, and the commit
//! primitive
//!
//! This module defines the trait abstractions between the mutation engine
//! and the backing store. The in-memory implementation lives in
//! [`crate::core::memory_store`]; a remote or on-disk backend implements
//! the same contracts.

use crate::types::{Account, AccountNumber, LedgerError, RequestId, TransactionId, TransactionRecord, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Snapshot of an account taken for a read-validate-commit cycle
///
/// The `version` pins the state the snapshot was taken against. A commit
/// carrying this version succeeds only if no other writer has touched the
/// account since the read.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountHandle {
    /// Account state at read time
    pub account: Account,

    /// Store version the snapshot was taken at
    pub version: u64,
}

/// A conditional balance write derived from a handle
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    /// Account to write
    pub account_number: AccountNumber,

    /// Version observed at read time; the write applies only if the
    /// stored version still matches
    pub expected_version: u64,

    /// New balance to commit
    pub new_balance: Decimal,
}

impl AccountHandle {
    /// Derive a conditional write of `new_balance` against this snapshot
    pub fn update(&self, new_balance: Decimal) -> AccountUpdate {
        AccountUpdate {
            account_number: self.account.account_number.clone(),
            expected_version: self.version,
            new_balance,
        }
    }
}

/// Errors surfaced by the atomic commit primitive
///
/// `Conflict` is transient: the engine re-reads and retries up to a
/// bound. The other variants are terminal for the attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommitError {
    /// A referenced account changed since its handle was taken
    #[error("Version conflict: an account changed since it was read")]
    Conflict,

    /// A record with the same idempotency key was already committed
    #[error("Duplicate request id")]
    DuplicateRequest,

    /// The storage layer failed; no partial effect was applied
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Trait for versioned account storage
///
/// Balance is the only shared mutable resource in the system, and it is
/// mutated exclusively through [`AccountStore::commit`]. All methods take
/// `&self`; implementations are internally synchronized.
pub trait AccountStore: Send + Sync {
    /// Create a new account
    ///
    /// Fails with `AccountExists` if the account number is taken.
    fn create(&self, account: Account) -> Result<Account, LedgerError>;

    /// Read an account without taking a version
    fn get_account(&self, account_number: &str) -> Option<Account>;

    /// Read an account together with its current version, for a
    /// subsequent conditional commit
    fn get_for_update(&self, account_number: &str) -> Result<AccountHandle, LedgerError>;

    /// List all accounts belonging to an owner, ordered by account number
    fn list_by_owner(&self, owner: &UserId) -> Vec<Account>;

    /// Flip the locked flag on an owned account
    ///
    /// Bumps the account version so in-flight optimistic commits against
    /// the old state are invalidated.
    fn toggle_lock(&self, account_number: &str, owner: &UserId) -> Result<Account, LedgerError>;

    /// Atomically apply a set of conditional balance writes together with
    /// the transaction-record append
    ///
    /// Either every update applies, the record is durably appended, and
    /// the request id (when present) is marked seen, or nothing happens
    /// at all. Implementations must acquire multi-account state in a
    /// total order (lexicographic by account number) so that opposing
    /// transfers cannot deadlock.
    fn commit(
        &self,
        updates: &[AccountUpdate],
        record: TransactionRecord,
        request_id: Option<RequestId>,
    ) -> Result<(), CommitError>;
}

/// Trait for reading the append-only transaction log
///
/// Appends happen only inside [`AccountStore::commit`]; this trait covers
/// the read paths.
pub trait TransactionLog: Send + Sync {
    /// Fetch a single record by id
    fn get_transaction(&self, id: TransactionId) -> Option<TransactionRecord>;

    /// List records touching an account (as sender or receiver), newest
    /// first
    fn list_by_account(&self, account_number: &str) -> Vec<TransactionRecord>;
}
