//! Tariff Service
//!
//! Fee schedules for transfers. The processor only needs a deterministic,
//! non-negative fee per transfer; which schedule applies is configuration.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{AccountNumber, Transfer};

/// Fees are charged in whole cents
const FEE_SCALE: u32 = 2;

/// Computes the commission owed to the bank for a transfer.
pub trait TariffService: Send + Sync {
    fn evaluate(&self, transfer: &Transfer) -> Decimal;
}

impl<F> TariffService for F
where
    F: Fn(&Transfer) -> Decimal + Send + Sync,
{
    fn evaluate(&self, transfer: &Transfer) -> Decimal {
        self(transfer)
    }
}

/// Free of charge
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTariff;

impl TariffService for NoTariff {
    fn evaluate(&self, _transfer: &Transfer) -> Decimal {
        Decimal::ZERO
    }
}

/// Flat fee plus a percentage of the amount, with a floor.
///
/// `fee = max(flat_fee + amount * rate, minimum_fee)`, rounded to cents.
/// Transfers to the exempt recipient (normally the bank itself) are free.
#[derive(Debug, Clone, Default)]
pub struct StandardTariff {
    flat_fee: Decimal,
    rate: Decimal,
    minimum_fee: Decimal,
    exempt_recipient: Option<AccountNumber>,
}

impl StandardTariff {
    pub fn new(flat_fee: Decimal, rate: Decimal, minimum_fee: Decimal) -> Self {
        Self {
            flat_fee,
            rate,
            minimum_fee,
            exempt_recipient: None,
        }
    }

    pub fn with_exempt_recipient(mut self, recipient: AccountNumber) -> Self {
        self.exempt_recipient = Some(recipient);
        self
    }
}

impl TariffService for StandardTariff {
    fn evaluate(&self, transfer: &Transfer) -> Decimal {
        if self.exempt_recipient.as_ref() == Some(&transfer.recipient) {
            return Decimal::ZERO;
        }

        // Out-of-range fees saturate; the processor rejects what it cannot add up
        let fee = transfer
            .amount
            .value()
            .checked_mul(self.rate)
            .and_then(|variable| variable.checked_add(self.flat_fee))
            .unwrap_or(Decimal::MAX)
            .max(self.minimum_fee);
        fee.round_dp_with_strategy(FEE_SCALE, RoundingStrategy::MidpointAwayFromZero)
            .max(Decimal::ZERO)
    }
}
