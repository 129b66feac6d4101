//! Email delivery for reports.
//!
//! Uses SMTP via lettre. Without credentials the mailer talks plain SMTP to an
//! internal relay; with credentials it upgrades with STARTTLS.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// Subject line of the attachment report email.
pub const REPORT_SUBJECT: &str = "Weekly Confluence Attachment Report";

/// Plain-text body of the attachment report email.
pub const REPORT_BODY: &str = "Report of Confluence attachment data.";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid attachment content type.
    #[error("Invalid content type: {0}")]
    ContentType(String),
}

/// A file to attach to a message.
#[derive(Debug, Clone)]
pub struct FileAttachment {
    /// File name shown to recipients.
    pub file_name: String,
    /// Raw file contents.
    pub contents: Vec<u8>,
}

/// Sends report emails to a fixed recipient list.
#[derive(Clone)]
pub struct ReportMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    recipients: Vec<String>,
}

impl ReportMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the STARTTLS relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let mailer = match &config.credentials {
            Some(credentials) => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                    .port(config.smtp_port)
                    .credentials(Credentials::new(
                        credentials.username.clone(),
                        credentials.password.expose_secret().to_string(),
                    ))
                    .build()
            }
            None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build(),
        };

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            recipients: config.recipients.clone(),
        })
    }

    /// Send the attachment report with `attachment` attached.
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be built or delivery fails.
    pub async fn send_report(&self, attachment: FileAttachment) -> Result<(), EmailError> {
        let message = build_message_with_attachment(
            &self.from_address,
            &self.recipients,
            REPORT_SUBJECT,
            REPORT_BODY,
            attachment,
        )?;

        self.mailer.send(message).await?;

        tracing::info!(
            recipients = self.recipients.len(),
            subject = %REPORT_SUBJECT,
            "Email sent successfully"
        );
        Ok(())
    }
}

/// Build a plain-text message with one `application/octet-stream` attachment.
///
/// # Errors
///
/// Returns error if an address does not parse or the message cannot be built.
pub fn build_message_with_attachment(
    from: &str,
    recipients: &[String],
    subject: &str,
    body: &str,
    attachment: FileAttachment,
) -> Result<Message, EmailError> {
    let mut builder = Message::builder().from(parse_mailbox(from)?).subject(subject);

    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let file = Attachment::new(attachment.file_name).body(
        attachment.contents,
        ContentType::parse("application/octet-stream")
            .map_err(|e| EmailError::ContentType(e.to_string()))?,
    );

    let message = builder.multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::plain(body.to_string()))
            .singlepart(file),
    )?;

    Ok(message)
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}
