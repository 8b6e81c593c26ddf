//! Outbound mail

pub mod smtp;
pub mod transport;

pub use smtp::SmtpMailer;
pub use transport::{DeliveryReceipt, MailTransport, OutgoingMail, RecordingMailer};
