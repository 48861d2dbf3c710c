//! Accounts and clients
//!
//! An account is identified by its number and owned by a client. It carries
//! no balance of its own; balances are derived from the transaction history.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Longest account number accepted (IBAN length)
const MAX_ACCOUNT_NUMBER_LEN: usize = 34;

/// Prefix of generated customer account numbers
const CUSTOMER_ACCOUNT_PREFIX: &str = "4081";

/// Random digits appended to the prefix
const CUSTOMER_ACCOUNT_DIGITS: usize = 12;

/// Owner of the bank's own accounts
pub const SYSTEM_CLIENT_ID: Uuid = Uuid::nil();

/// A syntactically valid account number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "String", into = "String")]
#[sqlx(transparent)]
pub struct AccountNumber(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountNumberError {
    #[error("account number is empty")]
    Empty,

    #[error("account number is longer than {MAX_ACCOUNT_NUMBER_LEN} characters")]
    TooLong,

    #[error("account number contains invalid character {0:?}")]
    InvalidCharacter(char),
}

impl AccountNumber {
    /// Validate and wrap an account number.
    pub fn parse(value: &str) -> Result<Self, AccountNumberError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(AccountNumberError::Empty);
        }
        if value.len() > MAX_ACCOUNT_NUMBER_LEN {
            return Err(AccountNumberError::TooLong);
        }
        if let Some(c) = value.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(AccountNumberError::InvalidCharacter(c));
        }
        Ok(Self(value.to_string()))
    }

    /// Generate a fresh customer account number.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let digits: String = (0..CUSTOMER_ACCOUNT_DIGITS)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        Self(format!("{CUSTOMER_ACCOUNT_PREFIX}{digits}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AccountNumber {
    type Err = AccountNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountNumberError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountNumber> for String {
    fn from(num: AccountNumber) -> Self {
        num.0
    }
}

impl PartialEq<str> for AccountNumber {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

/// The bank's own account: recipient of every commission and credit fee.
///
/// Configured once (see `Config::bank_account`) and handed to the components
/// that need it, so the number never appears as a literal in business logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount(AccountNumber);

impl BankAccount {
    pub fn new(number: AccountNumber) -> Self {
        Self(number)
    }

    pub fn number(&self) -> &AccountNumber {
        &self.0
    }
}

impl fmt::Display for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub num: AccountNumber,
    pub client_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Client record
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Client {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Client details captured at registration
#[derive(Debug, Clone, PartialEq)]
pub struct NewClient {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}
