//! Services module
//!
//! Collaborators consulted by the transaction processor.

mod balance;
mod tariff;

pub use balance::{BalanceService, LedgerBalance};
pub use tariff::{NoTariff, StandardTariff, TariffService};
