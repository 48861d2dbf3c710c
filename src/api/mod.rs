//! API module
//!
//! HTTP API endpoints over the transaction processor and registration.

pub mod routes;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::domain::BankAccount;
use crate::handlers::{RegistrationOrchestrator, TransactionProcessor};
use crate::notification::LoggingNotifier;
use crate::services::{LedgerBalance, StandardTariff};
use crate::store::BankStore;

pub use routes::create_router;

/// Shared state handed to every request
#[derive(Debug)]
pub struct AppState<S> {
    pub processor: TransactionProcessor<S>,
    pub registration: RegistrationOrchestrator<S>,
}

impl<S: BankStore> AppState<S> {
    pub fn new(store: S, bank: BankAccount, tariff: StandardTariff) -> Self {
        Self {
            processor: TransactionProcessor::new(store.clone(), LedgerBalance, tariff, bank),
            registration: RegistrationOrchestrator::new(store, LoggingNotifier),
        }
    }
}

/// Build the application router: health check plus `/api/v1`
pub fn app<S: BankStore>(state: AppState<S>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api/v1", create_router::<S>())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
