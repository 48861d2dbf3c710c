//! Registration Handler
//!
//! Registers a client, opens their first account and sends the
//! confirmation message.

use uuid::Uuid;

use crate::domain::{Account, AccountNumber};
use crate::notification::{LoggingNotifier, MessageTemplate, Notification, Notifier};
use crate::store::{AccountRegistry, ClientRegistry};

use super::{RegistrationCommand, RegistrationError};

/// Attempts at finding an unused account number
const MAX_ACCOUNT_NUMBER_ATTEMPTS: u32 = 3;

/// Sequences client creation, account opening and notification
#[derive(Debug, Clone)]
pub struct RegistrationOrchestrator<R, N = LoggingNotifier> {
    registry: R,
    notifier: N,
}

impl<R, N> RegistrationOrchestrator<R, N>
where
    R: AccountRegistry + ClientRegistry,
    N: Notifier,
{
    pub fn new(registry: R, notifier: N) -> Self {
        Self { registry, notifier }
    }

    /// Execute the registration command
    ///
    /// A failed notification is logged and does not undo the registration.
    pub async fn register(&self, command: RegistrationCommand) -> Result<Account, RegistrationError> {
        let new_client = command.to_client().map_err(RegistrationError::InvalidForm)?;
        let client = self.registry.save_client(new_client).await?;
        let account = self.open_account(client.id).await?;
        let token = Uuid::new_v4();

        let notification = Notification {
            to: client.email.clone(),
            template: MessageTemplate::RegistrationConfirmation,
            params: serde_json::json!({
                "client": client,
                "account": account,
                "token": token,
            }),
        };
        if let Err(e) = self.notifier.send(notification).await {
            tracing::warn!("Registration confirmation not sent: {}", e);
        }

        tracing::info!(
            client_id = %client.id,
            account = %account.num,
            "Account has been saved successfully"
        );
        Ok(account)
    }

    async fn open_account(&self, client_id: Uuid) -> Result<Account, RegistrationError> {
        for attempt in 1..=MAX_ACCOUNT_NUMBER_ATTEMPTS {
            match self
                .registry
                .open_account(AccountNumber::generate(), client_id)
                .await
            {
                Ok(account) => return Ok(account),
                Err(e) if e.is_conflict() => {
                    tracing::warn!(
                        "Account number taken, retrying (attempt {}/{})",
                        attempt,
                        MAX_ACCOUNT_NUMBER_ATTEMPTS
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(RegistrationError::AccountNumbersExhausted)
    }
}
