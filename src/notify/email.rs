// src/notify/email.rs
use anyhow::{Context, Result};
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};
use std::time::Duration;

use super::Notifier;
use crate::config::EmailSettings;
use crate::digest::Digest;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// SMTP submission (STARTTLS) authenticated as the sender.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl EmailNotifier {
    pub fn new(settings: &EmailSettings) -> Result<Self> {
        let from: Mailbox = settings.from.parse().context("invalid EMAIL_FROM")?;
        let to: Mailbox = settings.to.parse().context("invalid EMAIL_TO")?;

        let creds = Credentials::new(settings.from.clone(), settings.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
            .context("invalid SMTP_SERVER")?
            .port(settings.smtp_port)
            .credentials(creds)
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Self { mailer, from, to })
    }

    /// `multipart/alternative` message: plain text first, HTML preferred.
    pub fn build_message(&self, digest: &Digest) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject.clone())
            .multipart(MultiPart::alternative_plain_html(
                digest.text.clone(),
                digest.html.clone(),
            ))
            .context("build email")
    }
}

#[async_trait::async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, digest: &Digest) -> Result<()> {
        let msg = self.build_message(digest)?;
        self.mailer.send(msg).await.context("send email")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
