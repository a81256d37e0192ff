use std::future::Future;

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::info;

use super::{Mail, MailError, Mailer};
use crate::infrastructure::config::SmtpConfig;

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();
        let from = config.from.parse::<Mailbox>()?;

        info!(host = %config.host, port = config.port, "smtp mailer configured");
        Ok(Self { transport, from })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, mail: Mail) -> impl Future<Output = Result<(), MailError>> + Send {
        async move {
            let message = Message::builder()
                .from(self.from.clone())
                .to(mail.to.parse::<Mailbox>()?)
                .subject(mail.subject)
                .header(ContentType::TEXT_HTML)
                .body(mail.html)?;

            self.transport.send(message).await?;
            Ok(())
        }
    }
}
