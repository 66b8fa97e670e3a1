use crate::configuration::EmailSettings;
use anyhow::Context;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;

/// Outbound delivery of one contact message. The production implementation
/// talks SMTP; tests substitute a recording double.
#[async_trait::async_trait]
pub trait ContactMailer: Send + Sync {
    async fn send_contact_email(
        &self,
        reply_to: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
    owner: Mailbox,
}

impl SmtpMailer {
    pub fn new(settings: &EmailSettings) -> Result<Self, anyhow::Error> {
        // `relay` speaks implicit TLS, which is what port 465 expects.
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)
            .context("Failed to build the SMTP transport")?
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.expose_secret().clone(),
            ))
            .timeout(Some(settings.timeout()))
            .build();
        let sender = format!("\"{}\" <{}>", settings.sender_name, settings.username)
            .parse()
            .context("Invalid sender address in the email configuration")?;
        let owner = settings
            .owner
            .parse()
            .context("Invalid owner address in the email configuration")?;
        Ok(Self {
            transport,
            sender,
            owner,
        })
    }
}

#[async_trait::async_trait]
impl ContactMailer for SmtpMailer {
    #[tracing::instrument(
        name = "Relaying contact email over SMTP",
        skip(self, html_content, text_content)
    )]
    async fn send_contact_email(
        &self,
        reply_to: &str,
        subject: &str,
        html_content: &str,
        text_content: &str,
    ) -> Result<(), anyhow::Error> {
        let reply_to: Mailbox = reply_to
            .parse()
            .context("Failed to parse the submitter email as a reply-to address")?;
        let email = Message::builder()
            .from(self.sender.clone())
            .reply_to(reply_to)
            .to(self.owner.clone())
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(SinglePart::plain(text_content.to_owned()))
                    .singlepart(SinglePart::html(html_content.to_owned())),
            )
            .context("Failed to build the contact email")?;
        let response = self
            .transport
            .send(email)
            .await
            .context("The SMTP relay refused the message")?;
        tracing::info!(code = %response.code(), "Message accepted by the SMTP relay");
        Ok(())
    }
}
