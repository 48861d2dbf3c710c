//! Domain module
//!
//! Core domain types: amounts, accounts and ledger transactions.

pub mod account;
pub mod amount;
pub mod transaction;

pub use account::{
    Account, AccountNumber, AccountNumberError, BankAccount, Client, NewClient, SYSTEM_CLIENT_ID,
};
pub use amount::{Amount, AmountError};
pub use transaction::{
    NewTransaction, Transaction, TransactionId, TransactionProjection, Transfer,
    CREDIT_FEE_DETAILS,
};
