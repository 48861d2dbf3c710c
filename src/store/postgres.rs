//! PostgreSQL store
//!
//! Each unit of work is one database transaction. `lock_account` takes a
//! `FOR UPDATE` row lock on the account, so transfers from the same payer
//! queue behind each other. Under READ COMMITTED every statement issued
//! after the lock is granted reads a fresh snapshot, which makes the balance
//! read see all previously committed transfers.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::domain::{Account, AccountNumber, Client, NewClient, NewTransaction, Transaction};

use super::{
    AccountRegistry, AccountTotals, ClientRegistry, LedgerView, StoreError, TransactionStore,
    UnitOfWork,
};

/// PostgreSQL-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TransactionStore for PgStore {
    type Work = PgUnitOfWork;

    async fn begin(&self) -> Result<PgUnitOfWork, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(PgUnitOfWork { tx })
    }

    async fn find_all_by_account(&self, account: &str) -> Result<Vec<Transaction>, StoreError> {
        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, payer, recipient, amount, created_at, details
            FROM transactions
            WHERE payer = $1 OR recipient = $1
            ORDER BY id ASC
            "#,
        )
        .bind(account)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }
}

impl AccountRegistry for PgStore {
    async fn open_account(
        &self,
        num: AccountNumber,
        client_id: Uuid,
    ) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (num, client_id)
            VALUES ($1, $2)
            RETURNING num, client_id, created_at
            "#,
        )
        .bind(num.as_str())
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, format!("account {num}")))
    }

    async fn find_account(&self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT num, client_id, created_at FROM accounts WHERE num = $1",
        )
        .bind(num.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

impl ClientRegistry for PgStore {
    async fn save_client(&self, client: NewClient) -> Result<Client, StoreError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (id, first_name, last_name, email, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&client.first_name)
        .bind(&client.last_name)
        .bind(&client.email)
        .bind(&client.phone)
        .fetch_one(&self.pool)
        .await?;

        Ok(client)
    }
}

/// Unit of work over a [`PgStore`]: an open database transaction.
///
/// Dropping it without `commit` rolls the transaction back.
pub struct PgUnitOfWork {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl LedgerView for PgUnitOfWork {
    async fn totals(&mut self, account: &AccountNumber) -> Result<AccountTotals, StoreError> {
        let (credited, debited): (Decimal, Decimal) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE recipient = $1), 0) AS credited,
                COALESCE(SUM(amount) FILTER (WHERE payer = $1), 0) AS debited
            FROM transactions
            WHERE payer = $1 OR recipient = $1
            "#,
        )
        .bind(account.as_str())
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(AccountTotals { credited, debited })
    }
}

impl UnitOfWork for PgUnitOfWork {
    async fn lock_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT num, client_id, created_at FROM accounts WHERE num = $1 FOR UPDATE",
        )
        .bind(num.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account)
    }

    async fn find_account(&mut self, num: &AccountNumber) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT num, client_id, created_at FROM accounts WHERE num = $1",
        )
        .bind(num.as_str())
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(account)
    }

    async fn save(&mut self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let saved = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (payer, recipient, amount, created_at, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, payer, recipient, amount, created_at, details
            "#,
        )
        .bind(transaction.payer.as_str())
        .bind(transaction.recipient.as_str())
        .bind(transaction.amount)
        .bind(transaction.created_at)
        .bind(&transaction.details)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(saved)
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
