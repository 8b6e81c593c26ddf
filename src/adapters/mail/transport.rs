//! Outbound mail abstraction

use crate::domain::{MailError, Result, WaypointError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A plain-text message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl OutgoingMail {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Server acknowledgement of an accepted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// SMTP reply code, e.g. `250`
    pub code: String,
    /// First line of the server response
    pub response: String,
}

/// Mail transport with a verify/send contract
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Address messages are sent from
    fn sender(&self) -> &str;

    /// Check that the server accepts a connection (and credentials, if any)
    async fn verify(&self) -> Result<()>;

    /// Deliver one message
    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt>;
}

/// In-process transport that records messages instead of delivering them
///
/// Used by the test-suite and by `--dry-run` mail commands.
#[derive(Debug)]
pub struct RecordingMailer {
    sender: String,
    sent: Mutex<Vec<OutgoingMail>>,
    reject: AtomicBool,
}

impl RecordingMailer {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            sent: Mutex::new(Vec::new()),
            reject: AtomicBool::new(false),
        }
    }

    /// Make every verify/send fail with an authentication error
    pub fn reject_all(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// Messages accepted so far
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<()> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(WaypointError::Mail(MailError::Transport {
                message: "5.7.8 Authentication credentials invalid".to_string(),
                code: Some("535".to_string()),
            }));
        }
        Ok(())
    }
}

#[async_trait]
impl MailTransport for RecordingMailer {
    fn sender(&self) -> &str {
        &self.sender
    }

    async fn verify(&self) -> Result<()> {
        self.check()
    }

    async fn send(&self, mail: &OutgoingMail) -> Result<DeliveryReceipt> {
        self.check()?;
        if !mail.to.contains('@') {
            return Err(WaypointError::Mail(MailError::InvalidAddress {
                address: mail.to.clone(),
                message: "missing domain part".to_string(),
            }));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail.clone());
        }
        Ok(DeliveryReceipt {
            code: "250".to_string(),
            response: "recorded".to_string(),
        })
    }
}
