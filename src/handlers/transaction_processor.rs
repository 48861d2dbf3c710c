//! Transaction Processor
//!
//! Records transfers and their commissions, one unit of work per call.
//!
//! # Atomicity Guarantees
//!
//! The payer is locked before its balance is read, and both the primary
//! transaction and the commission are written in the same unit of work.
//! Any failure rolls the whole unit back, so either both records commit or
//! neither does.

use rust_decimal::Decimal;

use crate::domain::{
    Account, AccountNumber, Amount, AmountError, BankAccount, NewTransaction, Transaction,
    TransactionProjection, Transfer,
};
use crate::services::{BalanceService, LedgerBalance, StandardTariff, TariffService};
use crate::store::{TransactionStore, UnitOfWork};

use super::{TransactionError, TransferCommand};

/// Validates, prices and records transfers
#[derive(Debug, Clone)]
pub struct TransactionProcessor<S, B = LedgerBalance, T = StandardTariff> {
    store: S,
    balance: B,
    tariff: T,
    bank: BankAccount,
}

impl<S, B, T> TransactionProcessor<S, B, T>
where
    S: TransactionStore,
    B: BalanceService,
    T: TariffService,
{
    pub fn new(store: S, balance: B, tariff: T, bank: BankAccount) -> Self {
        Self {
            store,
            balance,
            tariff,
            bank,
        }
    }

    pub fn bank_account(&self) -> &BankAccount {
        &self.bank
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // create
    // =========================================================================

    /// Record a transfer and, when the tariff charges a fee, its commission.
    ///
    /// # Process
    ///
    /// 1. Validate the amount and both account numbers
    /// 2. Begin a unit of work and lock the payer
    /// 3. Resolve the recipient
    /// 4. Read the payer's balance and price the transfer
    /// 5. Reject if amount + fee exceeds the balance
    /// 6. Save the transfer, then the commission if the fee is positive
    /// 7. Commit (or roll back on any error)
    ///
    /// # Errors
    ///
    /// - `InvalidAmount`: amount is zero, negative or out of range
    /// - `InvalidAccount`: payer or recipient is malformed or unknown
    /// - `InsufficientFunds`: amount + fee exceeds the payer's balance
    /// - `Persistence`: the store failed; nothing was recorded
    pub async fn create(&self, command: TransferCommand) -> Result<Transaction, TransactionError> {
        let transfer = validate(command)?;

        let mut work = self.store.begin().await?;
        let result = self.record_transfer(&mut work, &transfer).await;
        let transaction = finish(work, result).await?;

        tracing::info!(
            id = transaction.id,
            payer = %transaction.payer,
            recipient = %transaction.recipient,
            amount = %transaction.amount,
            "Transfer recorded"
        );

        Ok(transaction)
    }

    async fn record_transfer(
        &self,
        work: &mut S::Work,
        transfer: &Transfer,
    ) -> Result<Transaction, TransactionError> {
        work.lock_account(&transfer.payer)
            .await?
            .ok_or_else(|| TransactionError::unknown_account(&transfer.payer))?;
        work.find_account(&transfer.recipient)
            .await?
            .ok_or_else(|| TransactionError::unknown_account(&transfer.recipient))?;

        let balance = self.balance.balance(&mut *work, &transfer.payer).await?;
        let fee = self.fee_for(transfer);
        let required = transfer.amount.value().checked_add(fee).ok_or_else(|| {
            tracing::warn!(
                amount = %transfer.amount.value(),
                %fee,
                "Transfer rejected: amount plus fee out of range"
            );
            TransactionError::InvalidAmount(AmountError::Overflow)
        })?;

        if required > balance {
            tracing::warn!(
                payer = %transfer.payer,
                %required,
                available = %balance,
                "Transfer rejected: insufficient funds"
            );
            return Err(TransactionError::InsufficientFunds {
                required,
                available: balance,
            });
        }

        let primary = work.save(transfer.to_new_transaction()).await?;

        if fee > Decimal::ZERO {
            let commission = work
                .save(NewTransaction::commission(&primary, fee, &self.bank))
                .await?;
            tracing::debug!(
                id = commission.id,
                primary = primary.id,
                %fee,
                "Commission recorded"
            );
        }

        Ok(primary)
    }

    fn fee_for(&self, transfer: &Transfer) -> Decimal {
        let fee = self.tariff.evaluate(transfer);
        if fee < Decimal::ZERO {
            tracing::warn!(%fee, "Tariff returned a negative fee, charging nothing");
            return Decimal::ZERO;
        }
        fee
    }

    // =========================================================================
    // credit_withdraw
    // =========================================================================

    /// Withdraw a credit fee from an account in favour of the bank.
    ///
    /// Neither the tariff nor the payer's balance is consulted, and the
    /// amount is recorded as given: the caller is responsible for it.
    pub async fn credit_withdraw(
        &self,
        account: &Account,
        amount: Decimal,
    ) -> Result<Transaction, TransactionError> {
        let mut work = self.store.begin().await?;
        let result = work
            .save(NewTransaction::credit_fee(&account.num, amount, &self.bank))
            .await
            .map_err(TransactionError::from);
        let transaction = finish(work, result).await?;

        tracing::info!(
            id = transaction.id,
            account = %account.num,
            %amount,
            "Credit fee withdrawn"
        );

        Ok(transaction)
    }

    // =========================================================================
    // by_account
    // =========================================================================

    /// History of an account, oldest first, with amounts signed from the
    /// account's point of view.
    pub async fn by_account(
        &self,
        account: &str,
    ) -> Result<Vec<TransactionProjection>, TransactionError> {
        let account = account.trim();
        if account.is_empty() {
            return Ok(Vec::new());
        }

        let transactions = self.store.find_all_by_account(account).await?;

        Ok(transactions
            .iter()
            .map(|tx| TransactionProjection::from_transaction(tx, account))
            .collect())
    }

    /// Current balance of an existing account
    pub async fn balance(&self, account: &str) -> Result<Decimal, TransactionError> {
        let num = AccountNumber::parse(account)
            .map_err(|e| TransactionError::malformed_account(account, e))?;

        let mut work = self.store.begin().await?;
        let result = self.read_balance(&mut work, &num).await;
        finish(work, result).await
    }

    async fn read_balance(
        &self,
        work: &mut S::Work,
        num: &AccountNumber,
    ) -> Result<Decimal, TransactionError> {
        work.find_account(num)
            .await?
            .ok_or_else(|| TransactionError::unknown_account(num))?;
        Ok(self.balance.balance(&mut *work, num).await?)
    }
}

fn validate(command: TransferCommand) -> Result<Transfer, TransactionError> {
    let amount = Amount::new(command.amount)?;
    let payer = AccountNumber::parse(&command.payer)
        .map_err(|e| TransactionError::malformed_account(&command.payer, e))?;
    let recipient = AccountNumber::parse(&command.recipient)
        .map_err(|e| TransactionError::malformed_account(&command.recipient, e))?;

    Ok(Transfer {
        payer,
        recipient,
        amount,
        details: command.details,
    })
}

/// Commit on success, roll back on failure.
async fn finish<W, R>(work: W, result: Result<R, TransactionError>) -> Result<R, TransactionError>
where
    W: UnitOfWork,
{
    match result {
        Ok(value) => {
            work.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = work.rollback().await {
                tracing::error!("Rollback failed after \"{}\": {}", err, rollback_err);
            }
            Err(err)
        }
    }
}
