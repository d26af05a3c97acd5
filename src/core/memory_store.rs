//! In-memory versioned account store and transaction log
//!
//! This module provides `MemoryStore`, the default backing for the
//! mutation engine. Accounts live in a `DashMap` of individually locked
//! cells, each carrying a monotonically increasing version; the
//! transaction log is an append-only map with a per-account index.
//!
//! # Commit protocol
//!
//! `commit` takes the per-account locks in lexicographic account-number
//! order, verifies that every referenced version is unchanged since the
//! caller's `get_for_update`, and only then writes the new balances,
//! bumps the versions, and appends the record. Opposing transfers
//! therefore cannot deadlock, and a stale handle is rejected with
//! `Conflict` before any mutation.
//!
//! # Thread safety
//!
//! All methods take `&self` and are safe to call from multiple threads.
//! `DashMap` shard locks are never held while a cell lock is taken; the
//! cell `Arc` is cloned out first.

use crate::core::traits::{
    AccountHandle, AccountStore, AccountUpdate, CommitError, TransactionLog,
};
use crate::types::{
    Account, LedgerError, RequestId, TransactionId, TransactionRecord, UserId,
};
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// An account cell: current state plus the commit version
#[derive(Debug)]
struct Versioned {
    account: Account,
    version: u64,
}

/// In-memory versioned account store with an integrated transaction log
///
/// The log lives alongside the accounts so that the record append can
/// happen inside the same critical section as the balance writes, which
/// is what makes the commit all-or-nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Account cells keyed by account number
    accounts: DashMap<String, Arc<Mutex<Versioned>>>,

    /// Committed transaction records by id
    log: DashMap<TransactionId, TransactionRecord>,

    /// Per-account index into the log, in commit order
    by_account: DashMap<String, Vec<TransactionId>>,

    /// Idempotency keys of committed requests, mapped to the record they
    /// produced
    seen_requests: DashMap<RequestId, TransactionId>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of enrolled accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Look up the record previously committed under an idempotency key
    pub fn committed_request(&self, request_id: RequestId) -> Option<TransactionRecord> {
        let id = *self.seen_requests.get(&request_id)?;
        self.log.get(&id).map(|entry| entry.value().clone())
    }

    fn cell(&self, account_number: &str) -> Option<Arc<Mutex<Versioned>>> {
        self.accounts
            .get(account_number)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn index_record(&self, record: &TransactionRecord) {
        self.by_account
            .entry(record.sender_account_number.clone())
            .or_default()
            .push(record.id);
        if let Some(receiver) = &record.receiver_account_number {
            self.by_account
                .entry(receiver.clone())
                .or_default()
                .push(record.id);
        }
    }
}

impl AccountStore for MemoryStore {
    fn create(&self, account: Account) -> Result<Account, LedgerError> {
        let mut created = false;
        self.accounts
            .entry(account.account_number.clone())
            .or_insert_with(|| {
                created = true;
                Arc::new(Mutex::new(Versioned {
                    account: account.clone(),
                    version: 0,
                }))
            });
        if created {
            Ok(account)
        } else {
            Err(LedgerError::account_exists(&account.account_number))
        }
    }

    fn get_account(&self, account_number: &str) -> Option<Account> {
        let cell = self.cell(account_number)?;
        let guard = cell.lock();
        Some(guard.account.clone())
    }

    fn get_for_update(&self, account_number: &str) -> Result<AccountHandle, LedgerError> {
        let cell = self
            .cell(account_number)
            .ok_or_else(|| LedgerError::account_not_found(account_number))?;
        let guard = cell.lock();
        Ok(AccountHandle {
            account: guard.account.clone(),
            version: guard.version,
        })
    }

    fn list_by_owner(&self, owner: &UserId) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .filter_map(|entry| {
                let guard = entry.value().lock();
                (guard.account.owner == *owner).then(|| guard.account.clone())
            })
            .collect();
        accounts.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        accounts
    }

    fn toggle_lock(&self, account_number: &str, owner: &UserId) -> Result<Account, LedgerError> {
        let cell = self
            .cell(account_number)
            .ok_or_else(|| LedgerError::account_not_found(account_number))?;
        let mut guard = cell.lock();
        if guard.account.owner != *owner {
            return Err(LedgerError::forbidden(account_number, owner));
        }
        guard.account.locked = !guard.account.locked;
        // A lock flip must invalidate any in-flight optimistic commit
        // that validated against the old flag.
        guard.version += 1;
        Ok(guard.account.clone())
    }

    fn commit(
        &self,
        updates: &[AccountUpdate],
        record: TransactionRecord,
        request_id: Option<RequestId>,
    ) -> Result<(), CommitError> {
        // Fast-path duplicate check before taking any lock. The
        // authoritative check happens again under the account locks.
        if let Some(rid) = request_id {
            if self.seen_requests.contains_key(&rid) {
                return Err(CommitError::DuplicateRequest);
            }
        }

        let mut pending: Vec<(&AccountUpdate, Arc<Mutex<Versioned>>)> =
            Vec::with_capacity(updates.len());
        for update in updates {
            let cell = self
                .cell(&update.account_number)
                .ok_or(CommitError::Conflict)?;
            pending.push((update, cell));
        }
        // Total acquisition order: lexicographic by account number.
        pending.sort_by(|a, b| a.0.account_number.cmp(&b.0.account_number));

        let mut guards = Vec::with_capacity(pending.len());
        for (update, cell) in &pending {
            guards.push((*update, cell.lock()));
        }

        if guards
            .iter()
            .any(|(update, guard)| guard.version != update.expected_version)
        {
            return Err(CommitError::Conflict);
        }

        if let Some(rid) = request_id {
            let mut first = false;
            self.seen_requests.entry(rid).or_insert_with(|| {
                first = true;
                record.id
            });
            if !first {
                return Err(CommitError::DuplicateRequest);
            }
        }

        for (update, guard) in &mut guards {
            guard.account.balance = update.new_balance;
            guard.version += 1;
        }

        // Publish the record before indexing it: a reader walking the
        // per-account index must always find the record it points at.
        self.log.insert(record.id, record.clone());
        self.index_record(&record);
        Ok(())
    }
}

impl TransactionLog for MemoryStore {
    fn get_transaction(&self, id: TransactionId) -> Option<TransactionRecord> {
        self.log.get(&id).map(|entry| entry.value().clone())
    }

    fn list_by_account(&self, account_number: &str) -> Vec<TransactionRecord> {
        let Some(ids) = self.by_account.get(account_number) else {
            return Vec::new();
        };
        // Newest first: ids are appended in commit order.
        ids.iter()
            .rev()
            .filter_map(|id| self.log.get(id).map(|entry| entry.value().clone()))
            .collect()
    }
}
