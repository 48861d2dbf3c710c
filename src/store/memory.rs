//! In-memory store
//!
//! Keeps accounts, clients and the ledger in process. Writes are staged in
//! the unit of work and appended to the ledger on commit; per-account async
//! mutexes give `lock_account` the same serialization a row lock gives in
//! PostgreSQL.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio::sync::OwnedMutexGuard;
use uuid::Uuid;

use crate::domain::{
    Account, AccountNumber, Client, NewClient, NewTransaction, Transaction, TransactionId,
};

use super::{
    AccountRegistry, AccountTotals, ClientRegistry, LedgerView, StoreError, TransactionStore,
    UnitOfWork,
};

#[derive(Debug, Default)]
struct State {
    accounts: BTreeMap<AccountNumber, Account>,
    clients: HashMap<Uuid, Client>,
    transactions: Vec<Transaction>,
    last_id: TransactionId,
}

impl State {
    fn next_id(&mut self) -> TransactionId {
        self.last_id += 1;
        self.last_id
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<State>,
    locks: Mutex<HashMap<AccountNumber, Arc<tokio::sync::Mutex<()>>>>,
}

impl Shared {
    // Guards are never held across an await, so a poisoned lock only means a
    // panic elsewhere; the data itself is still consistent.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn account_lock(&self, num: &AccountNumber) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(num.clone()).or_default().clone()
    }
}

/// Process-local store, cheap to clone
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an already committed transaction, bypassing any unit of work.
    /// Used to load opening balances.
    pub fn insert_transaction(&self, transaction: NewTransaction) -> Transaction {
        let mut state = self.shared.state();
        let id = state.next_id();
        let stored = transaction.with_id(id);
        state.transactions.push(stored.clone());
        stored
    }

    /// Number of committed transactions
    pub fn transaction_count(&self) -> usize {
        self.shared.state().transactions.len()
    }

    /// Snapshot of every committed transaction
    pub fn transactions(&self) -> Vec<Transaction> {
        self.shared.state().transactions.clone()
    }
}

impl TransactionStore for InMemoryStore {
    type Work = MemoryUnitOfWork;

    async fn begin(&self) -> Result<MemoryUnitOfWork, StoreError> {
        Ok(MemoryUnitOfWork {
            shared: Arc::clone(&self.shared),
            staged: Vec::new(),
            locked: HashSet::new(),
            guards: Vec::new(),
        })
    }

    async fn find_all_by_account(&self, account: &str) -> Result<Vec<Transaction>, StoreError> {
        let state = self.shared.state();
        Ok(state
            .transactions
            .iter()
            .filter(|tx| tx.touches(account))
            .cloned()
            .collect())
    }
}

impl AccountRegistry for InMemoryStore {
    async fn open_account(
        &self,
        num: AccountNumber,
        client_id: Uuid,
    ) -> Result<Account, StoreError> {
        let mut state = self.shared.state();
        if state.accounts.contains_key(&num) {
            return Err(StoreError::Conflict(format!("account {num}")));
        }

        let account = Account {
            num: num.clone(),
            client_id,
            created_at: Utc::now(),
        };
        state.accounts.insert(num, account.clone());
        Ok(account)
    }

    async fn find_account(&self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        Ok(self.shared.state().accounts.get(num).cloned())
    }
}

impl ClientRegistry for InMemoryStore {
    async fn save_client(&self, client: NewClient) -> Result<Client, StoreError> {
        let client = Client {
            id: Uuid::new_v4(),
            first_name: client.first_name,
            last_name: client.last_name,
            email: client.email,
            phone: client.phone,
            created_at: Utc::now(),
        };
        self.shared
            .state()
            .clients
            .insert(client.id, client.clone());
        Ok(client)
    }
}

/// Unit of work over an [`InMemoryStore`]
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    shared: Arc<Shared>,
    staged: Vec<Transaction>,
    locked: HashSet<AccountNumber>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl LedgerView for MemoryUnitOfWork {
    async fn totals(&mut self, account: &AccountNumber) -> Result<AccountTotals, StoreError> {
        let state = self.shared.state();
        let mut totals = AccountTotals::default();
        for tx in state.transactions.iter().chain(self.staged.iter()) {
            if tx.recipient == *account {
                totals.credited += tx.amount;
            }
            if tx.payer == *account {
                totals.debited += tx.amount;
            }
        }
        Ok(totals)
    }
}

impl UnitOfWork for MemoryUnitOfWork {
    async fn lock_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        if !self.locked.contains(num) {
            let lock = self.shared.account_lock(num);
            self.guards.push(lock.lock_owned().await);
            self.locked.insert(num.clone());
        }
        Ok(self.shared.state().accounts.get(num).cloned())
    }

    async fn find_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        Ok(self.shared.state().accounts.get(num).cloned())
    }

    async fn save(&mut self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let id = self.shared.state().next_id();
        let stored = transaction.with_id(id);
        self.staged.push(stored.clone());
        Ok(stored)
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        let staged = std::mem::take(&mut self.staged);
        let mut state = self.shared.state();
        state.transactions.extend(staged);
        // Ids are handed out at save time, units may commit out of order
        state.transactions.sort_by_key(|tx| tx.id);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
