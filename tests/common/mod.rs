//! Common test utilities

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use cbank::domain::{
    Account, AccountNumber, BankAccount, Client, NewClient, NewTransaction, Transaction,
    SYSTEM_CLIENT_ID,
};
use cbank::store::{
    AccountRegistry, AccountTotals, ClientRegistry, InMemoryStore, LedgerView, MemoryUnitOfWork,
    StoreError, TransactionStore, UnitOfWork,
};

pub const BANK: &str = "0000000000000000";
pub const ALICE: &str = "4081000000000001";
pub const BOB: &str = "4081000000000002";
pub const CAROL: &str = "4081000000000003";

pub fn num(s: &str) -> AccountNumber {
    AccountNumber::parse(s).expect("valid account number")
}

pub fn bank() -> BankAccount {
    BankAccount::new(num(BANK))
}

/// Store with the bank, Alice, Bob and Carol; Alice holds `balance`
pub async fn setup_store(balance: Decimal) -> InMemoryStore {
    let store = InMemoryStore::new();
    for n in [BANK, ALICE, BOB, CAROL] {
        store
            .open_account(num(n), SYSTEM_CLIENT_ID)
            .await
            .expect("Failed to open account");
    }
    if balance > Decimal::ZERO {
        fund(&store, ALICE, balance);
    }
    store
}

/// Credit an account from the bank outside any unit of work
pub fn fund(store: &InMemoryStore, account: &str, amount: Decimal) -> Transaction {
    store.insert_transaction(NewTransaction {
        payer: num(BANK),
        recipient: num(account),
        amount,
        created_at: Utc::now(),
        details: "Opening balance".to_string(),
    })
}

// =========================================================================
// Failure injection
// =========================================================================

/// In-memory store whose `fail_at`-th save (1-based, counted across units)
/// fails with `StoreError::Unavailable`.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: InMemoryStore,
    saves: Arc<AtomicUsize>,
    fail_at: usize,
}

impl FailingStore {
    pub fn new(inner: InMemoryStore, fail_at: usize) -> Self {
        Self {
            inner,
            saves: Arc::new(AtomicUsize::new(0)),
            fail_at,
        }
    }
}

pub struct FailingUnitOfWork {
    inner: MemoryUnitOfWork,
    saves: Arc<AtomicUsize>,
    fail_at: usize,
}

impl TransactionStore for FailingStore {
    type Work = FailingUnitOfWork;

    async fn begin(&self) -> Result<FailingUnitOfWork, StoreError> {
        Ok(FailingUnitOfWork {
            inner: self.inner.begin().await?,
            saves: Arc::clone(&self.saves),
            fail_at: self.fail_at,
        })
    }

    async fn find_all_by_account(&self, account: &str) -> Result<Vec<Transaction>, StoreError> {
        self.inner.find_all_by_account(account).await
    }
}

impl AccountRegistry for FailingStore {
    async fn open_account(&self, num: AccountNumber, client_id: Uuid) -> Result<Account, StoreError> {
        self.inner.open_account(num, client_id).await
    }

    async fn find_account(&self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        self.inner.find_account(num).await
    }
}

impl ClientRegistry for FailingStore {
    async fn save_client(&self, client: NewClient) -> Result<Client, StoreError> {
        self.inner.save_client(client).await
    }
}

impl LedgerView for FailingUnitOfWork {
    async fn totals(&mut self, account: &AccountNumber) -> Result<AccountTotals, StoreError> {
        self.inner.totals(account).await
    }
}

impl UnitOfWork for FailingUnitOfWork {
    async fn lock_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        self.inner.lock_account(num).await
    }

    async fn find_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        UnitOfWork::find_account(&mut self.inner, num).await
    }

    async fn save(&mut self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let n = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.fail_at {
            return Err(StoreError::Unavailable(format!("injected failure on save {n}")));
        }
        self.inner.save(transaction).await
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.inner.commit().await
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.inner.rollback().await
    }
}
