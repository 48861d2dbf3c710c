//! cbank Library
//!
//! Re-exports modules for the server binary, the load test and
//! integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod notification;
pub mod services;
pub mod store;

mod error;

pub use config::{Config, TariffConfig};
pub use domain::{Account, AccountNumber, Amount, AmountError, BankAccount, Transaction};
pub use error::{AppError, AppResult, ErrorResponse};
pub use handlers::{TransactionError, TransactionProcessor, TransferCommand};
pub use services::StandardTariff;
pub use store::{InMemoryStore, PgStore};

