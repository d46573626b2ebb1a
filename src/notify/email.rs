//! Email delivery over SMTP.
//!
//! Composes a `multipart/alternative` message (plain text first, HTML
//! second) and hands it to the relay in a single attempt. There is no
//! retry: the caller owns any retry policy.
//!
//! # Testability
//!
//! The `EmailNotifier` supports transport injection for testing:
//! - Production: Uses `AsyncSmtpTransport<Tokio1Executor>`
//! - Testing: Uses `MockEmailTransport` for unit tests without SMTP server

use crate::config::{Config, SmtpConfig};
use crate::error::NotifyError;
use crate::template::RenderedMessage;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

// =============================================================================
// EmailTransport Trait
// =============================================================================

/// Async email transport abstraction for testability.
///
/// This trait allows injecting mock transports in tests while using
/// the real `AsyncSmtpTransport` in production.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Send an email message.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Email accepted by the relay
    /// * `Err(String)` - Error message describing the failure
    async fn send_email(&self, message: Message) -> Result<(), String>;
}

/// Real SMTP transport wrapper implementing `EmailTransport`.
///
/// Each send opens its own connection, which is closed before the
/// call returns, on success and on error alike.
pub struct SmtpTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    pub fn new(transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self { inner: transport }
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn send_email(&self, message: Message) -> Result<(), String> {
        self.inner
            .send(message)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

/// Sends one rendered alert to the configured recipient.
///
/// - STARTTLS is required when `EMAIL_SMTP_TLS` is enabled, so
///   credentials never cross an unencrypted connection
/// - Authentication only when both username and password are set
/// - A single attempt; every transport fault becomes a [`NotifyError`]
pub struct EmailNotifier {
    /// Email transport for sending emails (abstracted for testability).
    transport: Arc<dyn EmailTransport>,
    /// Sender email address.
    from: Mailbox,
    /// Recipient email address.
    to: Mailbox,
}

impl EmailNotifier {
    /// Create a new EmailNotifier from configuration.
    ///
    /// Fails before any network activity when an address does not parse
    /// or the TLS parameters cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, NotifyError> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
                field: "from",
                address: config.from.clone(),
                message: e.to_string(),
            })?;

        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
                field: "to",
                address: config.to.clone(),
                message: e.to_string(),
            })?;

        let transport = Self::build_transport(&config.smtp)?;

        Ok(Self {
            transport: Arc::new(SmtpTransport::new(transport)),
            from,
            to,
        })
    }

    /// Create an EmailNotifier with a custom transport.
    ///
    /// This constructor enables dependency injection for testing.
    /// In production, use `from_config()` instead.
    pub fn with_transport(transport: Arc<dyn EmailTransport>, from: Mailbox, to: Mailbox) -> Self {
        Self {
            transport,
            from,
            to,
        }
    }

    /// Build SMTP transport based on the TLS flag and credentials.
    fn build_transport(
        smtp: &SmtpConfig,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotifyError> {
        let builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp.host.as_str())
                .port(smtp.port);

        let builder = if smtp.tls {
            let tls_params = TlsParameters::builder(smtp.host.clone())
                .build()
                .map_err(|e| NotifyError::Tls(e.to_string()))?;
            builder.tls(Tls::Required(tls_params))
        } else {
            // Plain SMTP, e.g. a local relay on port 25
            builder
        };

        let builder = match smtp.credentials() {
            Some((user, pass)) => {
                builder.credentials(Credentials::new(user.to_string(), pass.expose().to_string()))
            }
            None => builder,
        };

        Ok(builder.build())
    }

    /// Build the `multipart/alternative` message.
    ///
    /// The plain-text part comes first and the HTML part last, so mail
    /// clients that prefer the richer part pick the HTML.
    pub fn build_message(&self, rendered: &RenderedMessage) -> Result<Message, NotifyError> {
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(rendered.subject.as_str())
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(rendered.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(rendered.html_body.clone()),
                    ),
            )
            .map_err(|e| NotifyError::Compose(e.to_string()))
    }

    /// Compose and deliver the message in a single attempt.
    pub async fn send(&self, rendered: &RenderedMessage) -> Result<(), NotifyError> {
        let message = self.build_message(rendered)?;

        self.transport
            .send_email(message)
            .await
            .map_err(NotifyError::SendFailed)?;

        tracing::debug!(recipient = %self.to, "Email accepted by relay");
        Ok(())
    }
}

impl std::fmt::Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose transport details or credentials
        f.debug_struct("EmailNotifier")
            .field("from", &self.from.to_string())
            .field("to", &self.to.to_string())
            .finish()
    }
}
