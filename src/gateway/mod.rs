//! Operation gateway
//!
//! The boundary between the (excluded) HTTP/authentication layer and the
//! ledger core. Requests arrive here already authenticated, carrying a
//! `Requester` identity; the gateway maps them onto the engine and the
//! store's read paths, and translates `LedgerError` variants into stable
//! error codes with HTTP-class status hints.
//!
//! The gateway deliberately does no input-shape validation beyond what
//! the engine itself enforces; malformed-JSON handling and credential
//! checks belong to the outer layer.

use crate::core::{AccountStore, EngineConfig, LedgerEngine, TransactionLog};
use crate::types::{
    Account, AccountKind, AccountNumber, LedgerError, OperationRequest, Requester,
    TransactionId, TransactionRecord,
};
use serde::{Deserialize, Serialize};

/// Stable error codes exposed to callers
///
/// These names are the wire contract; the `LedgerError` display strings
/// are diagnostics and may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidAmount,
    AccountNotFound,
    Forbidden,
    AccountLocked,
    InsufficientFunds,
    ReceiverRequired,
    InvalidReceiver,
    AmountOutOfRange,
    AccountExists,
    DuplicateRequest,
    CommitFailed,
    TransactionNotFound,
}

/// Error envelope returned by every gateway method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiError {
    /// HTTP-class status hint (4xx business rejection, 5xx commit failure)
    pub status: u16,

    /// Stable machine-readable code
    pub code: ErrorCode,

    /// Human-readable diagnostic
    pub message: String,
}

impl From<LedgerError> for ApiError {
    fn from(error: LedgerError) -> Self {
        let (status, code) = match &error {
            LedgerError::InvalidAmount { .. } => (400, ErrorCode::InvalidAmount),
            LedgerError::AccountNotFound { .. } => (404, ErrorCode::AccountNotFound),
            LedgerError::Forbidden { .. } => (403, ErrorCode::Forbidden),
            LedgerError::AccountLocked { .. } => (423, ErrorCode::AccountLocked),
            LedgerError::InsufficientFunds { .. } => (400, ErrorCode::InsufficientFunds),
            LedgerError::ReceiverRequired { .. } => (400, ErrorCode::ReceiverRequired),
            LedgerError::SelfTransfer { .. } => (400, ErrorCode::InvalidReceiver),
            LedgerError::Overflow { .. } => (400, ErrorCode::AmountOutOfRange),
            LedgerError::AccountExists { .. } => (409, ErrorCode::AccountExists),
            LedgerError::DuplicateRequest { .. } => (409, ErrorCode::DuplicateRequest),
            LedgerError::CommitFailed { .. } => (503, ErrorCode::CommitFailed),
            LedgerError::TransactionNotFound { .. } => (404, ErrorCode::TransactionNotFound),
        };
        ApiError {
            status,
            code,
            message: error.to_string(),
        }
    }
}

/// Enrollment request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    /// Account number on the card
    pub account_number: AccountNumber,

    /// Account name on the card
    pub account_name: String,

    /// Debit or Credit
    pub kind: AccountKind,
}

/// Successful operation response: the committed record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResponse {
    pub transaction: TransactionRecord,
}

/// Operation gateway over an engine and its store
///
/// One instance serves all requesters; methods take `&self` and are safe
/// to call concurrently.
pub struct OperationGateway<S> {
    engine: LedgerEngine<S>,
}

impl<S: AccountStore + TransactionLog> OperationGateway<S> {
    /// Build a gateway with default engine configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Build a gateway with explicit engine configuration
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        OperationGateway {
            engine: LedgerEngine::with_config(store, config),
        }
    }

    /// Access the underlying engine
    pub fn engine(&self) -> &LedgerEngine<S> {
        &self.engine
    }

    fn store(&self) -> &S {
        self.engine.store()
    }

    /// Submit a money-movement operation
    pub fn submit_operation(
        &self,
        requester: &Requester,
        request: &OperationRequest,
    ) -> Result<OperationResponse, ApiError> {
        let transaction = self.engine.apply(requester, request)?;
        Ok(OperationResponse { transaction })
    }

    /// Enroll a new bank account for the requester
    ///
    /// The account starts with zero balance, unlocked.
    pub fn enroll_account(
        &self,
        requester: &Requester,
        request: &EnrollmentRequest,
    ) -> Result<Account, ApiError> {
        let account = Account::enroll(
            request.account_number.clone(),
            requester.user_id.clone(),
            request.account_name.clone(),
            request.kind,
        );
        Ok(self.store().create(account)?)
    }

    /// Flip the locked flag on one of the requester's accounts
    pub fn toggle_lock(
        &self,
        requester: &Requester,
        account_number: &str,
    ) -> Result<Account, ApiError> {
        Ok(self
            .store()
            .toggle_lock(account_number, &requester.user_id)?)
    }

    /// List the requester's accounts
    pub fn list_accounts(&self, requester: &Requester) -> Vec<Account> {
        self.store().list_by_owner(&requester.user_id)
    }

    /// Fetch one of the requester's accounts
    pub fn account_details(
        &self,
        requester: &Requester,
        account_number: &str,
    ) -> Result<Account, ApiError> {
        let account = self
            .store()
            .get_account(account_number)
            .ok_or_else(|| LedgerError::account_not_found(account_number))?;
        if account.owner != requester.user_id {
            return Err(LedgerError::forbidden(account_number, &requester.user_id).into());
        }
        Ok(account)
    }

    /// Transaction history for one of the requester's accounts, newest
    /// first
    pub fn transaction_history(
        &self,
        requester: &Requester,
        account_number: &str,
    ) -> Result<Vec<TransactionRecord>, ApiError> {
        // Ownership gate reuses the detail lookup.
        self.account_details(requester, account_number)?;
        Ok(self.store().list_by_account(account_number))
    }

    /// Fetch a single transaction record
    ///
    /// The requester must own the sender or receiver account.
    pub fn transaction_details(
        &self,
        requester: &Requester,
        id: TransactionId,
    ) -> Result<TransactionRecord, ApiError> {
        let record = self
            .store()
            .get_transaction(id)
            .ok_or_else(|| LedgerError::transaction_not_found(id))?;
        let owns_side = |number: &str| {
            self.store()
                .get_account(number)
                .map(|account| account.owner == requester.user_id)
                .unwrap_or(false)
        };
        let permitted = owns_side(&record.sender_account_number)
            || record
                .receiver_account_number
                .as_deref()
                .is_some_and(owns_side);
        if !permitted {
            return Err(
                LedgerError::forbidden(&record.sender_account_number, &requester.user_id).into(),
            );
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStore;
    use crate::types::OperationKind;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn gateway() -> OperationGateway<MemoryStore> {
        OperationGateway::new(MemoryStore::new())
    }

    fn enrollment(number: &str) -> EnrollmentRequest {
        EnrollmentRequest {
            account_number: number.to_string(),
            account_name: "Primary".to_string(),
            kind: AccountKind::Debit,
        }
    }

    #[rstest]
    #[case::invalid_amount(
        LedgerError::invalid_amount(Decimal::ZERO),
        400,
        ErrorCode::InvalidAmount
    )]
    #[case::not_found(LedgerError::account_not_found("ACC-1"), 404, ErrorCode::AccountNotFound)]
    #[case::forbidden(LedgerError::forbidden("ACC-1", "u"), 403, ErrorCode::Forbidden)]
    #[case::locked(LedgerError::account_locked("ACC-1"), 423, ErrorCode::AccountLocked)]
    #[case::insufficient(
        LedgerError::insufficient_funds("ACC-1", Decimal::ZERO, Decimal::ONE),
        400,
        ErrorCode::InsufficientFunds
    )]
    #[case::exists(LedgerError::account_exists("ACC-1"), 409, ErrorCode::AccountExists)]
    #[case::duplicate(
        LedgerError::duplicate_request(Uuid::nil()),
        409,
        ErrorCode::DuplicateRequest
    )]
    #[case::commit_failed(LedgerError::commit_failed("down"), 503, ErrorCode::CommitFailed)]
    fn test_error_mapping(
        #[case] error: LedgerError,
        #[case] status: u16,
        #[case] code: ErrorCode,
    ) {
        let api: ApiError = error.into();
        assert_eq!(api.status, status);
        assert_eq!(api.code, code);
    }

    #[test]
    fn test_enroll_then_operate_round_trip() {
        let gateway = gateway();
        let alice = Requester::customer("alice");

        let account = gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();
        assert_eq!(account.balance, Decimal::ZERO);

        let response = gateway
            .submit_operation(
                &alice,
                &OperationRequest::single(
                    OperationKind::CashIn,
                    "ACC-1",
                    Decimal::new(5000, 0),
                ),
            )
            .unwrap();
        assert_eq!(response.transaction.ending_balance, Decimal::new(5000, 0));

        let history = gateway.transaction_history(&alice, "ACC-1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, response.transaction.id);

        let detail = gateway
            .transaction_details(&alice, response.transaction.id)
            .unwrap();
        assert_eq!(detail, response.transaction);
    }

    #[test]
    fn test_enroll_duplicate_maps_to_conflict() {
        let gateway = gateway();
        let alice = Requester::customer("alice");

        gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();
        let error = gateway
            .enroll_account(&alice, &enrollment("ACC-1"))
            .unwrap_err();

        assert_eq!(error.status, 409);
        assert_eq!(error.code, ErrorCode::AccountExists);
    }

    #[test]
    fn test_history_of_foreign_account_forbidden() {
        let gateway = gateway();
        let alice = Requester::customer("alice");
        let mallory = Requester::customer("mallory");

        gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();

        let error = gateway.transaction_history(&mallory, "ACC-1").unwrap_err();
        assert_eq!(error.code, ErrorCode::Forbidden);
    }

    #[test]
    fn test_receiver_can_read_transaction_detail() {
        let gateway = gateway();
        let alice = Requester::customer("alice");
        let bob = Requester::customer("bob");

        gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();
        gateway.enroll_account(&bob, &enrollment("ACC-2")).unwrap();
        gateway
            .submit_operation(
                &alice,
                &OperationRequest::single(
                    OperationKind::CashIn,
                    "ACC-1",
                    Decimal::new(100, 0),
                ),
            )
            .unwrap();
        let response = gateway
            .submit_operation(
                &alice,
                &OperationRequest::two_party(
                    OperationKind::FundTransfer,
                    "ACC-1",
                    "ACC-2",
                    Decimal::new(40, 0),
                ),
            )
            .unwrap();

        let detail = gateway
            .transaction_details(&bob, response.transaction.id)
            .unwrap();
        assert_eq!(detail.amount, Decimal::new(40, 0));
    }

    #[test]
    fn test_list_accounts_scoped_to_owner() {
        let gateway = gateway();
        let alice = Requester::customer("alice");
        let bob = Requester::customer("bob");

        gateway.enroll_account(&alice, &enrollment("ACC-2")).unwrap();
        gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();
        gateway.enroll_account(&bob, &enrollment("ACC-3")).unwrap();

        let accounts = gateway.list_accounts(&alice);
        let numbers: Vec<&str> = accounts.iter().map(|a| a.account_number.as_str()).collect();
        assert_eq!(numbers, vec!["ACC-1", "ACC-2"]);
    }

    #[test]
    fn test_toggle_lock_via_gateway_blocks_operations() {
        let gateway = gateway();
        let alice = Requester::customer("alice");

        gateway.enroll_account(&alice, &enrollment("ACC-1")).unwrap();
        let account = gateway.toggle_lock(&alice, "ACC-1").unwrap();
        assert!(account.locked);

        let error = gateway
            .submit_operation(
                &alice,
                &OperationRequest::single(OperationKind::CashIn, "ACC-1", Decimal::ONE),
            )
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::AccountLocked);
        assert_eq!(error.status, 423);
    }
}
