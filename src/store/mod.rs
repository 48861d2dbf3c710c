//! Store module
//!
//! Persistence seams for the ledger. The transaction processor only sees
//! these traits; `PgStore` backs them with PostgreSQL and `InMemoryStore`
//! keeps everything in process.
//!
//! Writes go through a [`UnitOfWork`]: an explicit begin/commit/rollback
//! boundary. Dropping a unit of work without committing discards its writes.

mod error;
mod memory;
mod postgres;

use std::future::Future;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Account, AccountNumber, Client, NewClient, NewTransaction, Transaction};

pub use error::StoreError;
pub use memory::{InMemoryStore, MemoryUnitOfWork};
pub use postgres::{PgStore, PgUnitOfWork};

/// Sums of everything an account has received and paid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountTotals {
    pub credited: Decimal,
    pub debited: Decimal,
}

impl AccountTotals {
    /// Net position: credits minus debits
    pub fn net(&self) -> Decimal {
        self.credited - self.debited
    }
}

/// Read access to ledger totals
pub trait LedgerView {
    fn totals(
        &mut self,
        account: &AccountNumber,
    ) -> impl Future<Output = Result<AccountTotals, StoreError>> + Send;
}

/// One atomic unit of work against the ledger.
pub trait UnitOfWork: LedgerView + Send + Sized {
    /// Resolve an account and hold a write lock on it until the unit ends.
    ///
    /// Concurrent units locking the same account run one after another, and
    /// reads made after the lock is granted see everything committed before.
    fn lock_account(
        &mut self,
        num: &AccountNumber,
    ) -> impl Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Resolve an account without locking it.
    fn find_account(
        &mut self,
        num: &AccountNumber,
    ) -> impl Future<Output = Result<Option<Account>, StoreError>> + Send;

    /// Append a transaction; the store assigns the id.
    fn save(
        &mut self,
        transaction: NewTransaction,
    ) -> impl Future<Output = Result<Transaction, StoreError>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Ledger storage
pub trait TransactionStore: Send + Sync {
    type Work: UnitOfWork;

    /// Open a new unit of work.
    fn begin(&self) -> impl Future<Output = Result<Self::Work, StoreError>> + Send;

    /// Every committed transaction where the account is payer or recipient,
    /// in ascending id order.
    fn find_all_by_account(
        &self,
        account: &str,
    ) -> impl Future<Output = Result<Vec<Transaction>, StoreError>> + Send;
}

/// Account storage
pub trait AccountRegistry: Send + Sync {
    /// Create an account. Fails with `StoreError::Conflict` if the number is taken.
    fn open_account(
        &self,
        num: AccountNumber,
        client_id: Uuid,
    ) -> impl Future<Output = Result<Account, StoreError>> + Send;

    fn find_account(
        &self,
        num: &AccountNumber,
    ) -> impl Future<Output = Result<Option<Account>, StoreError>> + Send;
}

/// Client storage
pub trait ClientRegistry: Send + Sync {
    fn save_client(
        &self,
        client: NewClient,
    ) -> impl Future<Output = Result<Client, StoreError>> + Send;
}

/// Everything the service layer needs from a store
pub trait BankStore:
    TransactionStore + AccountRegistry + ClientRegistry + Clone + 'static
{
}

impl<S> BankStore for S where
    S: TransactionStore + AccountRegistry + ClientRegistry + Clone + 'static
{
}
