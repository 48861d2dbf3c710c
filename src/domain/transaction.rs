//! Transactions
//!
//! Ledger records are immutable once stored. A `Transfer` is a validated
//! request that has not been recorded yet.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{AccountNumber, Amount, BankAccount};

/// Store-assigned transaction identifier
pub type TransactionId = i64;

/// Details recorded on a credit fee withdrawal
pub const CREDIT_FEE_DETAILS: &str = "The credit's fee";

/// A recorded ledger transaction
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: TransactionId,
    pub payer: AccountNumber,
    pub recipient: AccountNumber,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub details: String,
}

impl Transaction {
    /// Whether the account takes part in this transaction on either side
    pub fn touches(&self, account: &str) -> bool {
        self.payer == *account || self.recipient == *account
    }
}

/// A transaction about to be saved; the store assigns its id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub payer: AccountNumber,
    pub recipient: AccountNumber,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub details: String,
}

impl NewTransaction {
    /// The commission owed to the bank for a recorded transaction.
    pub fn commission(primary: &Transaction, fee: Decimal, bank: &BankAccount) -> Self {
        Self {
            payer: primary.payer.clone(),
            recipient: bank.number().clone(),
            amount: fee,
            created_at: Utc::now().max(primary.created_at),
            details: format!("Commission for transaction {}", primary.id),
        }
    }

    /// A credit fee withdrawn from an account in favour of the bank.
    pub fn credit_fee(payer: &AccountNumber, amount: Decimal, bank: &BankAccount) -> Self {
        Self {
            payer: payer.clone(),
            recipient: bank.number().clone(),
            amount,
            created_at: Utc::now(),
            details: CREDIT_FEE_DETAILS.to_string(),
        }
    }

    pub fn with_id(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            payer: self.payer,
            recipient: self.recipient,
            amount: self.amount,
            created_at: self.created_at,
            details: self.details,
        }
    }
}

/// A validated transfer between two accounts
#[derive(Debug, Clone, PartialEq)]
pub struct Transfer {
    pub payer: AccountNumber,
    pub recipient: AccountNumber,
    pub amount: Amount,
    pub details: Option<String>,
}

impl Transfer {
    /// The primary ledger record for this transfer
    pub fn to_new_transaction(&self) -> NewTransaction {
        NewTransaction {
            payer: self.payer.clone(),
            recipient: self.recipient.clone(),
            amount: self.amount.value(),
            created_at: Utc::now(),
            details: self.details.clone().unwrap_or_default(),
        }
    }
}

/// A transaction as seen from one account.
///
/// The amount is negative when the account paid and positive when it
/// received. A transfer from an account to itself reads as a payment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionProjection {
    pub id: TransactionId,
    pub amount: Decimal,
    pub counterparty: AccountNumber,
    pub created_at: DateTime<Utc>,
    pub details: String,
}

impl TransactionProjection {
    pub fn from_transaction(transaction: &Transaction, account: &str) -> Self {
        let (amount, counterparty) = if transaction.payer == *account {
            (-transaction.amount, transaction.recipient.clone())
        } else {
            (transaction.amount, transaction.payer.clone())
        };

        Self {
            id: transaction.id,
            amount,
            counterparty,
            created_at: transaction.created_at,
            details: transaction.details.clone(),
        }
    }
}
