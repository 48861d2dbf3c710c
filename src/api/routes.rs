//! API Routes
//!
//! HTTP endpoint definitions.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{Account, AccountNumber, Amount, Transaction, TransactionProjection};
use crate::error::{AppError, AppResult};
use crate::handlers::{RegistrationCommand, TransactionError, TransferCommand};
use crate::store::BankStore;

use super::AppState;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct TransferRequest {
    pub payer: String,
    pub recipient: String,
    pub amount: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreditWithdrawRequest {
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account: String,
    pub balance: Decimal,
}

fn parse_amount(raw: &str) -> AppResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|_| AppError::InvalidRequest(format!("amount {:?} is not a number", raw)))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router<S: BankStore>() -> Router<Arc<AppState<S>>> {
    Router::new()
        .route("/registrations", post(register::<S>))
        .route("/transactions", post(create_transaction::<S>))
        .route(
            "/accounts/:num/credit-withdrawals",
            post(credit_withdraw::<S>),
        )
        .route("/accounts/:num/transactions", get(list_transactions::<S>))
        .route("/accounts/:num/balance", get(get_balance::<S>))
}

// =========================================================================
// POST /registrations
// =========================================================================

/// Register a client and open their first account
async fn register<S: BankStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<RegistrationRequest>,
) -> AppResult<(StatusCode, Json<Account>)> {
    let command = RegistrationCommand::new(request.first_name, request.last_name, request.email);
    let command = if let Some(phone) = request.phone {
        command.with_phone(phone)
    } else {
        command
    };

    let account = state.registration.register(command).await?;

    Ok((StatusCode::CREATED, Json(account)))
}

// =========================================================================
// POST /transactions
// =========================================================================

/// Transfer money between two accounts
async fn create_transaction<S: BankStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<TransferRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    let amount = parse_amount(&request.amount)?;

    let command = TransferCommand::new(request.payer, request.recipient, amount);
    let command = if let Some(details) = request.details {
        command.with_details(details)
    } else {
        command
    };

    let transaction = state.processor.create(command).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// =========================================================================
// POST /accounts/:num/credit-withdrawals
// =========================================================================

/// Withdraw a credit fee from an account in favour of the bank
async fn credit_withdraw<S: BankStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(num): Path<String>,
    Json(request): Json<CreditWithdrawRequest>,
) -> AppResult<(StatusCode, Json<Transaction>)> {
    // The ledger rejects negative rows, so screen the amount here
    let amount = Amount::new(parse_amount(&request.amount)?).map_err(TransactionError::from)?;

    let account_number =
        AccountNumber::parse(&num).map_err(|e| TransactionError::malformed_account(&num, e))?;
    let account = state
        .processor
        .store()
        .find_account(&account_number)
        .await?
        .ok_or_else(|| AppError::AccountNotFound(num.clone()))?;

    let transaction = state
        .processor
        .credit_withdraw(&account, amount.value())
        .await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// =========================================================================
// GET /accounts/:num/transactions
// =========================================================================

/// Account history, oldest first
async fn list_transactions<S: BankStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(num): Path<String>,
) -> AppResult<Json<Vec<TransactionProjection>>> {
    let history = state.processor.by_account(&num).await?;
    Ok(Json(history))
}

// =========================================================================
// GET /accounts/:num/balance
// =========================================================================

/// Current balance of an account
async fn get_balance<S: BankStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(num): Path<String>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = state.processor.balance(&num).await?;

    Ok(Json(BalanceResponse {
        account: num,
        balance,
    }))
}
