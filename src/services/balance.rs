//! Balance Service
//!
//! An account's balance is never stored; it is the net of every committed
//! transaction the account took part in.

use std::future::Future;

use rust_decimal::Decimal;

use crate::domain::AccountNumber;
use crate::store::{LedgerView, StoreError};

/// Computes the available balance of an account.
///
/// The caller supplies the ledger view to read through. During a transfer
/// that is the open unit of work, so the balance is read under the same
/// lock and isolation as the writes that follow.
pub trait BalanceService: Send + Sync {
    fn balance<L: LedgerView + Send>(
        &self,
        ledger: &mut L,
        account: &AccountNumber,
    ) -> impl Future<Output = Result<Decimal, StoreError>> + Send;
}

/// Balance as credits minus debits over the whole ledger
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerBalance;

impl BalanceService for LedgerBalance {
    async fn balance<L: LedgerView + Send>(
        &self,
        ledger: &mut L,
        account: &AccountNumber,
    ) -> Result<Decimal, StoreError> {
        let totals = ledger.totals(account).await?;
        Ok(totals.net())
    }
}
