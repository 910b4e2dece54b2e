//! Notification sink for outgoing mail.
//!
//! Transport is an external concern; the core only hands a composed
//! message to a [`Mailer`]. The default implementation records the
//! dispatch in the log stream.

use async_trait::async_trait;

use crate::error::AuthError;

/// A composed notification ready for dispatch.
#[derive(Debug, Clone)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Dispatch seam for outgoing notifications.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), AuthError>;
}

/// A mailer that logs dispatches instead of delivering them.
pub struct LogMailer {
    sender: String,
}

impl LogMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        LogMailer {
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AuthError> {
        tracing::info!(
            from = %self.sender,
            to = %message.to,
            subject = %message.subject,
            "dispatching notification"
        );
        Ok(())
    }
}
