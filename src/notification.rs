//! Notifications
//!
//! Outbound messages to clients. Delivery (email, SMS) lives outside this
//! crate; `LoggingNotifier` records what would have been sent.

use std::future::Future;

use serde::Serialize;

/// Message templates known to the delivery side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageTemplate {
    RegistrationConfirmation,
}

impl MessageTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageTemplate::RegistrationConfirmation => "registration_confirmation",
        }
    }
}

/// A message addressed to one recipient
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub to: String,
    pub template: MessageTemplate,
    pub params: serde_json::Value,
}

#[derive(Debug, thiserror::Error)]
#[error("Notification to {to} failed: {reason}")]
pub struct NotificationError {
    pub to: String,
    pub reason: String,
}

/// Sends notifications
pub trait Notifier: Send + Sync {
    fn send(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            to = %notification.to,
            template = notification.template.as_str(),
            params = %notification.params,
            "Notification dispatched"
        );
        Ok(())
    }
}
