//! SMTP delivery via `lettre`

use super::transport::{DeliveryReceipt, MailTransport, OutgoingMail};
use crate::config::MailConfig;
use crate::domain::{MailError, Result, WaypointError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Mail transport backed by an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    sender: String,
    host: String,
    port: u16,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Build a transport from `[mail]`
    ///
    /// Port 465 uses implicit TLS, other ports STARTTLS; `secure = false`
    /// falls back to plain SMTP. No connection is made until
    /// [`MailTransport::verify`] or [`MailTransport::send`].
    ///
    /// # Errors
    ///
    /// Returns `MailError::NotConfigured` when host or sender is missing and
    /// `MailError::InvalidAddress` when the sender cannot be parsed.
    pub fn from_config(config: &MailConfig) -> Result<Self> {
        let host = config.require_host()?.to_string();
        let sender = config.require_from()?.to_string();
        let from = parse_mailbox(&sender)?;
        let credentials = config.credentials()?;

        let mut builder = if !config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&host)
        } else if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&host).map_err(transport_error)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&host)
                .map_err(transport_error)?
        };
        builder = builder.port(config.port).timeout(Some(SMTP_TIMEOUT));

        if let Some((user, pass)) = credentials {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        tracing::debug!(
            host = %host,
            port = config.port,
            secure = config.secure,
            implicit_tls = config.implicit_tls(),
            "SMTP transport configured"
        );

        Ok(Self {
            transport: builder.build(),
            from,
            sender,
            host,
            port: config.port,
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    fn sender(&self) -> &str {
        &self.sender
    }

    async fn verify(&self) -> Result<()> {
        let accepted = self
            .transport
            .test_connection()
            .await
            .map_err(transport_error)?;
        if !accepted {
            return Err(WaypointError::Mail(MailError::Transport {
                message: format!("{}:{} did not accept the connection", self.host, self.port),
                code: None,
            }));
        }
        Ok(())
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(parse_mailbox(&mail.to)?)
            .subject(mail.subject.as_str())
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .map_err(|e| WaypointError::Mail(MailError::Build(e.to_string())))?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(transport_error)?;

        Ok(DeliveryReceipt {
            code: response.code().to_string(),
            response: response.first_line().unwrap_or_default().to_string(),
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse::<Mailbox>().map_err(|e| {
        WaypointError::Mail(MailError::InvalidAddress {
            address: address.to_string(),
            message: e.to_string(),
        })
    })
}

fn transport_error(error: lettre::transport::smtp::Error) -> WaypointError {
    let code = error.status().map(|code| code.to_string());
    tracing::error!(error = %error, code = ?code, "SMTP transport failure");
    WaypointError::Mail(MailError::Transport {
        message: error.to_string(),
        code,
    })
}
