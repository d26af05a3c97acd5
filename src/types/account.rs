//! Account-related types for the Ledger Engine
//!
//! This module defines the Account structure and related functionality
//! for managing enrolled bank account state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Owning user identifier
///
/// Assigned by the (out-of-scope) authentication layer and carried
/// through as an opaque string.
pub type UserId = String;

/// Bank account number
///
/// Unique identifier for an enrolled account, as printed on the card.
pub type AccountNumber = String;

/// Account kind
///
/// Determines which overdraft rules apply: Debit accounts can never go
/// negative, Credit accounts may draw down to a configurable limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    /// Standard account; balance must stay at or above zero
    Debit,

    /// Credit line; balance may go negative up to the configured overdraft limit
    Credit,
}

/// Enrolled bank account state
///
/// Represents the current state of an enrolled account. The `balance`
/// field is only ever written through the store's commit primitive,
/// driven by the mutation engine; no other writer touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account number
    pub account_number: AccountNumber,

    /// Identifier of the owning user (weak reference, lookup only)
    pub owner: UserId,

    /// Display name on the card
    pub account_name: String,

    /// Debit or Credit
    pub kind: AccountKind,

    /// Current balance
    ///
    /// Fixed-point decimal; never a float. Starts at zero on enrollment
    /// and changes only when an operation commits.
    pub balance: Decimal,

    /// Whether the account is locked
    ///
    /// A locked account rejects every balance-affecting operation,
    /// whether it appears as sender or receiver. Accounts are never
    /// hard-deleted; locking is the retirement mechanism.
    pub locked: bool,

    /// When the account was enrolled
    pub enrolled_at: DateTime<Utc>,
}

impl Account {
    /// Create a freshly enrolled account: zero balance, unlocked
    pub fn enroll(
        account_number: AccountNumber,
        owner: UserId,
        account_name: String,
        kind: AccountKind,
    ) -> Self {
        Account {
            account_number,
            owner,
            account_name,
            kind,
            balance: Decimal::ZERO,
            locked: false,
            enrolled_at: Utc::now(),
        }
    }
}
