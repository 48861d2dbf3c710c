//! Handler Error Types

use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::{AccountNumberError, AmountError};
use crate::store::StoreError;

/// Why a transfer or withdrawal was not recorded.
///
/// Every variant means nothing was persisted.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Amount is zero, negative or otherwise not a valid transfer amount
    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    /// Payer or recipient is malformed or does not exist
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Amount plus fee exceeds the payer's balance
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    /// The unit of work failed or could not commit
    #[error("Persistence failure: {0}")]
    Persistence(#[from] StoreError),
}

impl TransactionError {
    pub fn malformed_account(num: &str, err: AccountNumberError) -> Self {
        Self::InvalidAccount(format!("{num:?}: {err}"))
    }

    pub fn unknown_account(num: impl std::fmt::Display) -> Self {
        Self::InvalidAccount(format!("{num}: no such account"))
    }

    /// Check if this is a client error (caller's fault)
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Persistence(_))
    }
}

/// Registration failures
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("Invalid registration: {0}")]
    InvalidForm(String),

    #[error("Could not allocate a free account number")]
    AccountNumbersExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}
