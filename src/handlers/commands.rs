//! Command definitions
//!
//! Commands carry raw caller input; handlers validate them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::NewClient;

// =========================================================================
// TransferCommand
// =========================================================================

/// Command to move money from one account to another
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferCommand {
    pub payer: String,
    pub recipient: String,
    pub amount: Decimal,
    pub details: Option<String>,
}

impl TransferCommand {
    pub fn new(payer: impl Into<String>, recipient: impl Into<String>, amount: Decimal) -> Self {
        Self {
            payer: payer.into(),
            recipient: recipient.into(),
            amount,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

// =========================================================================
// RegistrationCommand
// =========================================================================

/// Command to register a client and open their first account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationCommand {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
}

impl RegistrationCommand {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Trimmed client details, or a description of the first invalid field
    pub fn to_client(&self) -> Result<NewClient, String> {
        let first_name = self.first_name.trim();
        let last_name = self.last_name.trim();
        let email = self.email.trim();

        if first_name.is_empty() {
            return Err("first_name is required".to_string());
        }
        if last_name.is_empty() {
            return Err("last_name is required".to_string());
        }
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => return Err(format!("email {email:?} is not valid")),
        }

        Ok(NewClient {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            phone: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string),
        })
    }
}
