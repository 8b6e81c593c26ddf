//! Mail diagnostics and notification resends

use crate::adapters::mail::{DeliveryReceipt, MailTransport, OutgoingMail};
use crate::adapters::store::{DocumentStore, Filter};
use crate::core::users::normalize_email;
use crate::domain::records::{decode, display_or_dash};
use crate::domain::{Result, User};
use std::fmt;

/// The transport accepted a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailVerifyReport {
    pub sender: String,
}

impl fmt::Display for MailVerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "✅ Mail server is ready (sender {})", self.sender)
    }
}

/// A message was accepted for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSendReport {
    pub to: String,
    pub subject: String,
    pub receipt: DeliveryReceipt,
}

impl fmt::Display for MailSendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "✅ Sent '{}' to {} ({} {})",
            self.subject, self.to, self.receipt.code, self.receipt.response
        )
    }
}

/// Check that the mail server accepts a connection
///
/// # Errors
///
/// Transport failures carry the SMTP reply code when the server sent one.
pub async fn verify_transport(transport: &dyn MailTransport) -> Result<MailVerifyReport> {
    transport.verify().await?;
    tracing::info!(sender = transport.sender(), "Mail transport verified");
    Ok(MailVerifyReport {
        sender: transport.sender().to_string(),
    })
}

/// Send a plain-text test message
pub async fn send_test_email(transport: &dyn MailTransport, to: &str) -> Result<MailSendReport> {
    let to = normalize_email(to)?;
    let mail = OutgoingMail::new(
        to.as_str(),
        "Waypoint test email",
        format!(
            "This is a test message sent by waypoint at {}.\n\nIf you received it, outbound mail is working.\n",
            chrono::Utc::now().to_rfc3339()
        ),
    );
    let receipt = transport.send(&mail).await?;
    tracing::info!(to = %to, code = %receipt.code, "Test email sent");
    Ok(MailSendReport {
        to,
        subject: mail.subject,
        receipt,
    })
}

/// Outcome of an approval notification resend
#[derive(Debug, Clone, PartialEq)]
pub enum NotifyOutcome {
    Sent(MailSendReport),
    NotFound,
    /// The user exists but is not approved, so nothing was sent
    NotApproved(User),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NotifyReport {
    pub email: String,
    pub outcome: NotifyOutcome,
}

impl fmt::Display for NotifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            NotifyOutcome::Sent(sent) => write!(f, "{sent}"),
            NotifyOutcome::NotFound => write!(f, "⚠️  User '{}' not found", self.email),
            NotifyOutcome::NotApproved(user) => write!(
                f,
                "⚠️  User '{}' ({}) is not approved; notification not sent",
                self.email,
                display_or_dash(&user.name)
            ),
        }
    }
}

/// The "account approved" message for a user
pub fn approval_notification(user: &User, to: &str, app_base_url: &str) -> OutgoingMail {
    let greeting = user
        .name
        .as_deref()
        .map(|name| format!("Hello {name},"))
        .unwrap_or_else(|| "Hello,".to_string());
    OutgoingMail::new(
        to,
        "Your account has been approved",
        format!(
            "{greeting}\n\nYour account has been approved by an administrator.\nYou can now sign in at {}/login.\n",
            app_base_url.trim_end_matches('/')
        ),
    )
}

/// Resend the approval notification to the user with `email`
///
/// A missing or unapproved user is a normal outcome.
pub async fn notify_user_approved(
    store: &dyn DocumentStore,
    users_collection: &str,
    transport: &dyn MailTransport,
    email: &str,
    app_base_url: &str,
) -> Result<NotifyReport> {
    let email = normalize_email(email)?;
    let Some(document) = store
        .find_one(users_collection, &Filter::eq("email", email.as_str()))
        .await?
    else {
        tracing::info!(email = %email, "User not found");
        return Ok(NotifyReport {
            email,
            outcome: NotifyOutcome::NotFound,
        });
    };
    let user: User = decode(document)?;

    if !user.is_approved {
        tracing::warn!(email = %email, "User is not approved");
        return Ok(NotifyReport {
            email,
            outcome: NotifyOutcome::NotApproved(user),
        });
    }

    let mail = approval_notification(&user, &email, app_base_url);
    let receipt = transport.send(&mail).await.map_err(|e| {
        tracing::error!(email = %email, error = %e, "Approval notification failed");
        e
    })?;
    tracing::info!(email = %email, code = %receipt.code, "Approval notification sent");

    Ok(NotifyReport {
        email: email.clone(),
        outcome: NotifyOutcome::Sent(MailSendReport {
            to: email,
            subject: mail.subject,
            receipt,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mail::RecordingMailer;
    use crate::adapters::store::MemoryStore;
    use serde_json::json;

    async fn store() -> MemoryStore {
        let store = MemoryStore::default();
        store
            .seed(
                "users",
                vec![
                    json!({"_id": "u1", "name": "Ana", "email": "ana@example.com", "isApproved": true}),
                    json!({"_id": "u2", "name": "Ben", "email": "ben@example.com", "isApproved": false}),
                ],
            )
            .await;
        store
    }

    #[tokio::test]
    async fn test_notify_sends_to_approved_user() {
        let store = store().await;
        let mailer = RecordingMailer::new("office@example.com");
        let report = notify_user_approved(
            &store,
            "users",
            &mailer,
            "ana@example.com",
            "https://backoffice.example.com/",
        )
        .await
        .unwrap();
        assert!(matches!(report.outcome, NotifyOutcome::Sent(_)));
        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.contains("Hello Ana,"));
        assert!(sent[0].body.contains("https://backoffice.example.com/login"));
    }

    #[tokio::test]
    async fn test_notify_unknown_and_unapproved_send_nothing() {
        let store = store().await;
        let mailer = RecordingMailer::new("office@example.com");
        let report = notify_user_approved(&store, "users", &mailer, "zoe@example.com", "http://x")
            .await
            .unwrap();
        assert_eq!(report.outcome, NotifyOutcome::NotFound);

        let report = notify_user_approved(&store, "users", &mailer, "ben@example.com", "http://x")
            .await
            .unwrap();
        assert!(matches!(report.outcome, NotifyOutcome::NotApproved(_)));
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_test_email_propagates_transport_error() {
        let mailer = RecordingMailer::new("office@example.com");
        mailer.reject_all(true);
        let err = send_test_email(&mailer, "ana@example.com").await.unwrap_err();
        assert!(err.is_connection_failure());
    }
}
