//! Balance mutation engine
//!
//! This module provides the LedgerEngine, the only code path that changes
//! account balances. An operation is applied as a read-validate-commit
//! cycle: snapshot the touched accounts with their versions, run the
//! precondition checks in order, compute the new balances with checked
//! arithmetic, and hand the conditional writes plus the transaction
//! record to the store's atomic commit.
//!
//! A version conflict at commit time means another operation landed on
//! one of the accounts between read and write; the engine re-reads and
//! revalidates from scratch, up to a bounded number of attempts. No lock
//! is ever held across the cycle, so a slow or remote store never blocks
//! unrelated operations.

use crate::core::traits::{AccountHandle, AccountStore, AccountUpdate, CommitError};
use crate::types::{
    Account, AccountKind, LedgerError, OperationKind, OperationRequest, Requester, Role,
    TransactionRecord,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

/// Engine tuning knobs
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How many times a version conflict is retried before the operation
    /// surfaces as `CommitFailed`
    pub max_commit_retries: u32,

    /// How far below zero a Credit account may draw
    ///
    /// Zero means no overdraft. Debit accounts never go negative
    /// regardless of this setting.
    pub credit_overdraft_limit: Decimal,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_commit_retries: 5,
            credit_overdraft_limit: Decimal::ZERO,
        }
    }
}

/// A validated operation, ready to commit
struct PreparedCommit {
    updates: Vec<AccountUpdate>,
    record: TransactionRecord,
}

/// Balance mutation engine
///
/// Generic over the store so tests can inject failing or instrumented
/// backends. The engine takes `&self` everywhere and is freely shared
/// across tasks behind an `Arc`.
pub struct LedgerEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: AccountStore> LedgerEngine<S> {
    /// Create an engine with default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Create an engine with explicit configuration
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        LedgerEngine { store, config }
    }

    /// Access the backing store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply a money-movement operation
    ///
    /// Returns the committed transaction record, or an error with zero
    /// side effects. Preconditions are checked in a fixed order:
    /// amount, sender existence and ownership, sender lock, funds,
    /// receiver existence and lock.
    pub fn apply(
        &self,
        requester: &Requester,
        request: &OperationRequest,
    ) -> Result<TransactionRecord, LedgerError> {
        if request.amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(request.amount));
        }

        let mut attempt = 0;
        loop {
            let prepared = self.prepare(requester, request)?;
            let record = prepared.record.clone();
            match self
                .store
                .commit(&prepared.updates, prepared.record, request.request_id)
            {
                Ok(()) => {
                    info!(
                        kind = request.kind.as_str(),
                        sender = %request.sender_account_number,
                        amount = %request.amount,
                        ending_balance = %record.ending_balance,
                        "operation committed"
                    );
                    return Ok(record);
                }
                Err(CommitError::Conflict) => {
                    attempt += 1;
                    debug!(
                        kind = request.kind.as_str(),
                        sender = %request.sender_account_number,
                        attempt,
                        "version conflict, re-reading"
                    );
                    if attempt >= self.config.max_commit_retries {
                        return Err(LedgerError::commit_failed(format!(
                            "version conflict persisted after {attempt} attempts"
                        )));
                    }
                }
                Err(CommitError::DuplicateRequest) => {
                    return match request.request_id {
                        Some(request_id) => Err(LedgerError::duplicate_request(request_id)),
                        // The store may only deduplicate keyed requests; a
                        // duplicate for an unkeyed request is a broken commit.
                        None => Err(LedgerError::commit_failed(
                            "store reported a duplicate for a request without an idempotency key",
                        )),
                    };
                }
                Err(CommitError::Unavailable(reason)) => {
                    return Err(LedgerError::commit_failed(reason));
                }
            }
        }
    }

    /// Run the precondition checks against fresh snapshots and compute
    /// the conditional writes
    fn prepare(
        &self,
        requester: &Requester,
        request: &OperationRequest,
    ) -> Result<PreparedCommit, LedgerError> {
        let sender = self.store.get_for_update(&request.sender_account_number)?;
        self.check_sender_access(requester, request, &sender.account)?;

        if sender.account.locked {
            return Err(LedgerError::account_locked(&sender.account.account_number));
        }

        if request.kind.debits_sender() {
            let available = self.available_funds(&sender.account);
            if request.amount > available {
                return Err(LedgerError::insufficient_funds(
                    &sender.account.account_number,
                    available,
                    request.amount,
                ));
            }
        }

        let receiver = if request.kind.has_receiver() {
            Some(self.validate_receiver(request, &sender.account)?)
        } else {
            None
        };

        self.compute(request, sender, receiver)
    }

    /// Ownership check: the sender account must belong to the requester,
    /// except that a Biller may initiate PAY_BILLS collections against
    /// accounts it does not own.
    fn check_sender_access(
        &self,
        requester: &Requester,
        request: &OperationRequest,
        sender: &Account,
    ) -> Result<(), LedgerError> {
        if sender.owner == requester.user_id {
            return Ok(());
        }
        if requester.role == Role::Biller && request.kind == OperationKind::PayBills {
            return Ok(());
        }
        Err(LedgerError::forbidden(
            &sender.account_number,
            &requester.user_id,
        ))
    }

    /// Funds available to a debit operation
    fn available_funds(&self, account: &Account) -> Decimal {
        match account.kind {
            AccountKind::Debit => account.balance,
            AccountKind::Credit => account.balance + self.config.credit_overdraft_limit,
        }
    }

    fn validate_receiver(
        &self,
        request: &OperationRequest,
        sender: &Account,
    ) -> Result<AccountHandle, LedgerError> {
        let receiver_number = request
            .receiver_account_number
            .as_deref()
            .ok_or_else(|| LedgerError::receiver_required(request.kind.as_str()))?;
        if receiver_number == sender.account_number {
            return Err(LedgerError::self_transfer(receiver_number));
        }
        let receiver = self.store.get_for_update(receiver_number)?;
        if receiver.account.locked {
            return Err(LedgerError::account_locked(receiver_number));
        }
        Ok(receiver)
    }

    /// Compute new balances and build the record
    fn compute(
        &self,
        request: &OperationRequest,
        sender: AccountHandle,
        receiver: Option<AccountHandle>,
    ) -> Result<PreparedCommit, LedgerError> {
        let sender_number = sender.account.account_number.clone();
        let new_sender_balance = if request.kind.debits_sender() {
            sender
                .account
                .balance
                .checked_sub(request.amount)
                .ok_or_else(|| LedgerError::overflow(request.kind.as_str(), &sender_number))?
        } else {
            sender
                .account
                .balance
                .checked_add(request.amount)
                .ok_or_else(|| LedgerError::overflow(request.kind.as_str(), &sender_number))?
        };

        let mut updates = vec![sender.update(new_sender_balance)];
        if let Some(receiver) = &receiver {
            let new_receiver_balance = receiver
                .account
                .balance
                .checked_add(request.amount)
                .ok_or_else(|| {
                    LedgerError::overflow(
                        request.kind.as_str(),
                        &receiver.account.account_number,
                    )
                })?;
            updates.push(receiver.update(new_receiver_balance));
        }

        let record = TransactionRecord {
            id: Uuid::new_v4(),
            kind: request.kind,
            sender_account_number: sender_number,
            receiver_account_number: request.receiver_account_number.clone(),
            receiver_account_name: request.receiver_account_name.clone(),
            amount: request.amount,
            ending_balance: new_sender_balance,
            note: request.note.clone(),
            created_at: Utc::now(),
        };

        Ok(PreparedCommit { updates, record })
    }
}
