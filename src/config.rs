//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::{AccountNumber, BankAccount};
use crate::services::StandardTariff;

/// Highest accepted `TARIFF_RATE` (100%)
const MAX_TARIFF_RATE: Decimal = Decimal::ONE;

/// Highest accepted flat or minimum fee
const MAX_TARIFF_FEE: i64 = 1_000_000_000_000;

/// Account number of the bank unless `BANK_ACCOUNT` says otherwise
pub const DEFAULT_BANK_ACCOUNT: &str = "0000000000000000";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Recipient of commissions and credit fees
    pub bank_account: BankAccount,

    /// Tariff parameters
    pub tariff: TariffConfig,
}

/// Parameters of the standard tariff; all zero means transfers are free
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TariffConfig {
    pub flat_fee: Decimal,
    pub rate: Decimal,
    pub minimum_fee: Decimal,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))?;

        let database_max_connections = parse_or("DATABASE_MAX_CONNECTIONS", 10)?;

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_or("PORT", 3000)?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let bank_account = env::var("BANK_ACCOUNT")
            .unwrap_or_else(|_| DEFAULT_BANK_ACCOUNT.to_string());
        let bank_account = AccountNumber::parse(&bank_account)
            .map(BankAccount::new)
            .map_err(|_| ConfigError::InvalidValue("BANK_ACCOUNT"))?;

        let tariff = TariffConfig {
            flat_fee: parse_or("TARIFF_FLAT_FEE", Decimal::ZERO)?,
            rate: parse_or("TARIFF_RATE", Decimal::ZERO)?,
            minimum_fee: parse_or("TARIFF_MINIMUM_FEE", Decimal::ZERO)?,
        };
        tariff.validate()?;

        Ok(Self {
            database_url,
            database_max_connections,
            host,
            port,
            environment,
            bank_account,
            tariff,
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Socket address string for the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl TariffConfig {
    /// Standard tariff with these parameters; transfers to the bank are free
    pub fn standard_tariff(&self, bank: &BankAccount) -> StandardTariff {
        StandardTariff::new(self.flat_fee, self.rate, self.minimum_fee)
            .with_exempt_recipient(bank.number().clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let max_fee = Decimal::from(MAX_TARIFF_FEE);
        if self.flat_fee.is_sign_negative() || self.flat_fee > max_fee {
            return Err(ConfigError::InvalidValue("TARIFF_FLAT_FEE"));
        }
        if self.rate.is_sign_negative() || self.rate > MAX_TARIFF_RATE {
            return Err(ConfigError::InvalidValue("TARIFF_RATE"));
        }
        if self.minimum_fee.is_sign_negative() || self.minimum_fee > max_fee {
            return Err(ConfigError::InvalidValue("TARIFF_MINIMUM_FEE"));
        }
        Ok(())
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
