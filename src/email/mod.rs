pub mod templates;

use std::fmt;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;
use crate::registration::{Receipt, RegistrationRecord};

#[derive(Debug)]
pub struct NotifyError {
    pub message: String,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for NotifyError {}

impl From<String> for NotifyError {
    fn from(message: String) -> Self {
        NotifyError { message }
    }
}

/// Side channel told about every newly stored registration.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, record: &RegistrationRecord, receipt: &Receipt) -> Result<(), NotifyError>;
}

/// Addressing and linking for staff emails, independent of the transport.
#[derive(Debug, Clone)]
pub struct StaffEnvelope {
    from: Mailbox,
    to: Mailbox,
    record_url: String,
}

impl StaffEnvelope {
    pub fn new(config: &MailConfig) -> Result<Self, String> {
        let from = config
            .from
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid MAIL_FROM address: {e}"))?;
        let to = config
            .notification_address
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid NOTIFICATION_ADDRESS: {e}"))?;

        Ok(Self {
            from,
            to,
            record_url: config.record_url.clone(),
        })
    }

    pub fn record_link(&self, receipt: &Receipt) -> String {
        format!("{}{}", self.record_url, receipt.document_id)
    }

    pub fn build_message(&self, record: &RegistrationRecord, receipt: &Receipt) -> Result<Message, NotifyError> {
        let html = templates::render_registration(record, receipt, &self.record_link(receipt));

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(templates::subject(record));

        // Lets staff answer the parent directly; skipped if the address won't parse
        if let Ok(reply_to) = record.registration.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }

        builder
            .header(ContentType::TEXT_HTML)
            .body(html)
            .map_err(|e| NotifyError::from(format!("Failed to build email: {e}")))
    }
}

/// Emails staff a summary of each registration over SMTP.
pub struct StaffNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    envelope: StaffEnvelope,
}

impl StaffNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, String> {
        let envelope = StaffEnvelope::new(config)?;
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| format!("SMTP error: {e}"))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self { transport, envelope })
    }
}

#[async_trait]
impl Notifier for StaffNotifier {
    async fn notify(&self, record: &RegistrationRecord, receipt: &Receipt) -> Result<(), NotifyError> {
        let message = self.envelope.build_message(record, receipt)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::from(format!("Failed to send email: {e}")))?;

        tracing::info!(document_id = %receipt.document_id, "Staff notification sent");
        Ok(())
    }
}
