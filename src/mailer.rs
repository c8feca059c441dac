use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::{
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::config::AppConfig;

/// Outbound email transport. One call delivers one message to every
/// recipient; there is no retry and no per-recipient result.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .context("failed to create SMTP transport")?
            .port(config.smtp_port);

        if let (Some(username), Some(password)) =
            (config.smtp_username.clone(), config.smtp_password.clone())
        {
            builder = builder.credentials(Credentials::new(username, password));
        }

        let from = config
            .mail_from
            .parse::<Mailbox>()
            .context("MAIL_FROM is not a valid mailbox")?;

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &[String], subject: &str, body: &str) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(subject);

        for address in to {
            let mailbox = address
                .parse::<Mailbox>()
                .with_context(|| format!("invalid recipient address: {address}"))?;
            builder = builder.to(mailbox);
        }

        let message = builder
            .body(body.to_string())
            .context("failed to build email")?;

        self.transport
            .send(message)
            .await
            .context("failed to send email")?;

        Ok(())
    }
}
