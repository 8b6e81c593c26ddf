//! Mail commands: verify-mail, send-test-email, notify-approved
//!
//! With `--dry-run`, messages are rendered and printed instead of sent.

use super::{report_failure, CommandContext, EXIT_OK};
use crate::adapters::mail::{MailTransport, RecordingMailer, SmtpMailer};
use crate::config::WaypointConfig;
use crate::core::mail::{notify_user_approved, send_test_email, verify_transport};
use crate::core::session::MaintenanceSession;
use crate::domain::Result;
use clap::Args;

/// SMTP for real runs, a recorder under `--dry-run`
enum Transport {
    Smtp(SmtpMailer),
    Recording(RecordingMailer),
}

impl Transport {
    fn from_config(config: &WaypointConfig) -> Result<Self> {
        if config.application.dry_run {
            tracing::info!("Dry-run: mail will be recorded, not sent");
            let sender = config.mail.from.clone().unwrap_or_default();
            return Ok(Transport::Recording(RecordingMailer::new(sender)));
        }
        Ok(Transport::Smtp(SmtpMailer::from_config(&config.mail)?))
    }

    fn as_dyn(&self) -> &dyn MailTransport {
        match self {
            Transport::Smtp(mailer) => mailer,
            Transport::Recording(mailer) => mailer,
        }
    }

    fn print_recorded(&self) {
        let Transport::Recording(mailer) = self else {
            return;
        };
        for mail in mailer.sent() {
            println!("[dry-run] Not sent. Would deliver:");
            println!("  To:      {}", mail.to);
            println!("  Subject: {}", mail.subject);
            for line in mail.body.lines() {
                println!("  | {line}");
            }
        }
    }
}

/// Arguments for the verify-mail command
#[derive(Args, Debug)]
pub struct VerifyMailArgs {}

impl VerifyMailArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config = match ctx.load() {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };
        let transport = match SmtpMailer::from_config(&config.mail) {
            Ok(transport) => transport,
            Err(e) => return Ok(report_failure("Invalid mail configuration", &e)),
        };

        println!(
            "📧 Verifying SMTP connection to {}:{}",
            config.mail.host.as_deref().unwrap_or_default(),
            config.mail.port
        );
        match verify_transport(&transport).await {
            Ok(report) => {
                println!("{report}");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("Mail server verification failed", &e)),
        }
    }
}

/// Arguments for the send-test-email command
#[derive(Args, Debug)]
pub struct SendTestEmailArgs {
    /// Recipient address
    #[arg(long)]
    pub to: String,
}

impl SendTestEmailArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config = match ctx.load() {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };
        let transport = match Transport::from_config(&config) {
            Ok(transport) => transport,
            Err(e) => return Ok(report_failure("Invalid mail configuration", &e)),
        };

        match send_test_email(transport.as_dyn(), &self.to).await {
            Ok(report) => {
                transport.print_recorded();
                println!("{report}");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("Sending test email failed", &e)),
        }
    }
}

/// Arguments for the notify-approved command
#[derive(Args, Debug)]
pub struct NotifyApprovedArgs {
    /// Email of the approved user
    #[arg(long)]
    pub email: String,
}

impl NotifyApprovedArgs {
    pub async fn execute(&self, ctx: &CommandContext) -> anyhow::Result<i32> {
        let config = match ctx.load() {
            Ok(config) => config,
            Err(e) => return Ok(report_failure("Failed to load configuration", &e)),
        };
        let transport = match Transport::from_config(&config) {
            Ok(transport) => transport,
            Err(e) => return Ok(report_failure("Invalid mail configuration", &e)),
        };

        let session = match MaintenanceSession::open(&config.database).await {
            Ok(session) => session,
            Err(e) => return Ok(report_failure("Failed to connect to database", &e)),
        };

        let transport_ref = transport.as_dyn();
        let users = config.database.collections.users.clone();
        let base_url = config.api.base_url.clone();
        let email = self.email.clone();
        let result = session
            .run(|store| async move {
                notify_user_approved(store.as_ref(), &users, transport_ref, &email, &base_url)
                    .await
            })
            .await;

        match result {
            Ok(report) => {
                transport.print_recorded();
                println!("{report}");
                Ok(EXIT_OK)
            }
            Err(e) => Ok(report_failure("Approval notification failed", &e)),
        }
    }
}
