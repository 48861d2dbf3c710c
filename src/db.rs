//! Database module
//!
//! Connection pool, migrations and startup checks.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::domain::{BankAccount, SYSTEM_CLIENT_ID};

/// Open the connection pool described by the configuration
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
}

/// Apply the SQL migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Simple connectivity check
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Create the system client and the bank account if they are missing
pub async fn seed_bank_account(pool: &PgPool, bank: &BankAccount) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO clients (id, first_name, last_name, email)
        VALUES ($1, 'System', 'Bank', 'system@bank.local')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(SYSTEM_CLIENT_ID)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO accounts (num, client_id)
        VALUES ($1, $2)
        ON CONFLICT (num) DO NOTHING
        "#,
    )
    .bind(bank.number().as_str())
    .bind(SYSTEM_CLIENT_ID)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(account = %bank.number(), "Bank account seeded");
    Ok(())
}

/// Check if required tables and the bank account exist
pub async fn check_schema(pool: &PgPool, bank: &BankAccount) -> Result<bool, sqlx::Error> {
    let required_tables = ["clients", "accounts", "transactions"];

    for table in required_tables {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    let bank_exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE num = $1)")
            .bind(bank.number().as_str())
            .fetch_one(pool)
            .await?;

    if !bank_exists {
        tracing::error!(
            "Bank account '{}' does not exist. Please run database seed.",
            bank.number()
        );
        return Ok(false);
    }

    tracing::info!("Bank account verified: {}", bank.number());
    Ok(true)
}
