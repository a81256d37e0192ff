pub mod smtp;

use std::future::Future;

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build mail message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub trait Mailer: Send + Sync + 'static {
    fn send(&self, mail: Mail) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// Stands in for SMTP when no credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: Mail) -> impl Future<Output = Result<(), MailError>> + Send {
        async move {
            info!(target: "mail", to = %mail.to, subject = %mail.subject, "smtp disabled, mail not sent");
            Ok(())
        }
    }
}
