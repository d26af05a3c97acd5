//! Transaction-related types for the Ledger Engine
//!
//! This module defines operation kinds, the ephemeral operation request,
//! the requester identity, and the durable transaction record written to
//! the log when an operation commits.

use super::account::{AccountNumber, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction identifier
///
/// Generated by the engine when an operation commits; unique per record.
pub type TransactionId = Uuid;

/// Idempotency key supplied by the caller
///
/// Optional; when present, a second commit carrying the same key is
/// rejected instead of applied twice.
pub type RequestId = Uuid;

/// Money-movement operation kinds supported by the engine
///
/// Each variant determines which accounts are touched and in which
/// direction the balance moves. The wire names match the original
/// service's transaction names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    /// Credit funds to the sender account from an external source
    CashIn,

    /// Debit funds from the sender account to an external sink
    ///
    /// Requires sufficient available funds.
    CashOut,

    /// Move funds from the sender account to a receiver account
    ///
    /// Requires sufficient available funds and an unlocked receiver.
    FundTransfer,

    /// Pay a biller from the sender account
    ///
    /// Balance-wise identical to a fund transfer; may be initiated by a
    /// requester holding the Biller role on behalf of the payee.
    PayBills,
}

impl OperationKind {
    /// Whether this kind debits the sender account
    pub fn debits_sender(&self) -> bool {
        !matches!(self, OperationKind::CashIn)
    }

    /// Whether this kind moves funds into a second account
    pub fn has_receiver(&self) -> bool {
        matches!(self, OperationKind::FundTransfer | OperationKind::PayBills)
    }

    /// Wire name, as used in log output and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::CashIn => "CASH_IN",
            OperationKind::CashOut => "CASH_OUT",
            OperationKind::FundTransfer => "FUND_TRANSFER",
            OperationKind::PayBills => "PAY_BILLS",
        }
    }
}

/// Role of the requester, populated by the excluded authentication layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Regular account holder; may only operate on accounts they own
    Customer,

    /// Registered biller; may additionally initiate PAY_BILLS collections
    /// against accounts they do not own
    Biller,
}

/// Authenticated identity attached to every inbound request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requester {
    /// The authenticated user id
    pub user_id: UserId,

    /// The requester's role
    pub role: Role,
}

impl Requester {
    /// Convenience constructor for a customer identity
    pub fn customer(user_id: impl Into<UserId>) -> Self {
        Requester {
            user_id: user_id.into(),
            role: Role::Customer,
        }
    }

    /// Convenience constructor for a biller identity
    pub fn biller(user_id: impl Into<UserId>) -> Self {
        Requester {
            user_id: user_id.into(),
            role: Role::Biller,
        }
    }
}

/// Ephemeral operation request
///
/// Not persisted; validated and consumed by the engine. The receiver
/// fields are only meaningful for FUND_TRANSFER and PAY_BILLS.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Which operation to perform
    pub kind: OperationKind,

    /// Account the operation is charged against
    pub sender_account_number: AccountNumber,

    /// Receiving account, for two-account kinds
    pub receiver_account_number: Option<AccountNumber>,

    /// Display name of the receiver, carried through to the record
    pub receiver_account_name: Option<String>,

    /// Amount to move; must be strictly positive
    pub amount: Decimal,

    /// Free-form note, carried through to the record
    pub note: Option<String>,

    /// Optional idempotency key
    ///
    /// When set, the store rejects a second commit with the same key, so
    /// a caller that saw a timeout can safely resubmit.
    pub request_id: Option<RequestId>,
}

impl OperationRequest {
    /// Build a single-account request (CASH_IN / CASH_OUT)
    pub fn single(kind: OperationKind, sender: impl Into<AccountNumber>, amount: Decimal) -> Self {
        OperationRequest {
            kind,
            sender_account_number: sender.into(),
            receiver_account_number: None,
            receiver_account_name: None,
            amount,
            note: None,
            request_id: None,
        }
    }

    /// Build a two-account request (FUND_TRANSFER / PAY_BILLS)
    pub fn two_party(
        kind: OperationKind,
        sender: impl Into<AccountNumber>,
        receiver: impl Into<AccountNumber>,
        amount: Decimal,
    ) -> Self {
        OperationRequest {
            kind,
            sender_account_number: sender.into(),
            receiver_account_number: Some(receiver.into()),
            receiver_account_name: None,
            amount,
            note: None,
            request_id: None,
        }
    }

    /// Attach an idempotency key
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Attach a note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Durable transaction record
///
/// Written to the log in the same atomic commit as the balance changes.
/// Immutable once written; exactly one record exists per accepted
/// operation, and rejected operations write nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Generated unique identifier
    pub id: TransactionId,

    /// Which operation was performed
    pub kind: OperationKind,

    /// Account the operation was charged against
    pub sender_account_number: AccountNumber,

    /// Receiving account, for two-account kinds
    pub receiver_account_number: Option<AccountNumber>,

    /// Display name of the receiver at request time
    pub receiver_account_name: Option<String>,

    /// Amount moved; strictly positive
    pub amount: Decimal,

    /// Sender balance immediately after this transaction committed
    ///
    /// Equals the value written to the sender account in the same atomic
    /// unit, for all four kinds.
    pub ending_balance: Decimal,

    /// Free-form note from the request
    pub note: Option<String>,

    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}
