//! cbank - retail bank transaction server
//!
//! Serves transfers, credit fee withdrawals, account history and client
//! registration over HTTP, backed by PostgreSQL.

use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cbank::api::{self, AppState};
use cbank::{db, Config, PgStore};

/// Initialize tracing/logging; JSON lines in production
fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cbank=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing
    init_tracing(config.is_production());
    let addr: SocketAddr = config.bind_address().parse()?;

    tracing::info!(environment = %config.environment, "Starting cbank server");
    tracing::info!("Connecting to database...");

    // Create database pool
    let pool = db::create_pool(&config).await?;
    db::verify_connection(&pool).await?;

    db::run_migrations(&pool).await?;
    db::seed_bank_account(&pool, &config.bank_account).await?;

    // Verify database schema
    if !db::check_schema(&pool, &config.bank_account).await? {
        tracing::error!("Database schema is not complete. Please run migrations.");
        return Err(anyhow::anyhow!("Database schema incomplete"));
    }

    tracing::info!("Database connected successfully");

    let tariff = config.tariff.standard_tariff(&config.bank_account);
    tracing::info!(
        flat_fee = %config.tariff.flat_fee,
        rate = %config.tariff.rate,
        minimum_fee = %config.tariff.minimum_fee,
        "Tariff loaded"
    );

    let state = AppState::new(PgStore::new(pool.clone()), config.bank_account.clone(), tariff);
    let app = api::app(state);

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cleanup
    tracing::info!("Server shutting down...");
    pool.close().await;
    tracing::info!("Database connections closed. Goodbye!");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}
