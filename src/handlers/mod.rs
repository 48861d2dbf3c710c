//! Command Handlers module
//!
//! Handlers that orchestrate business operations over the store and the
//! balance and tariff services.

mod commands;
mod error;
mod registration;
mod transaction_processor;


pub use commands::*;
pub use error::{RegistrationError, TransactionError};
pub use registration::RegistrationOrchestrator;
pub use transaction_processor::TransactionProcessor;
