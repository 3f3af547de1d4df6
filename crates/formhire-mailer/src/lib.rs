//! Outbound email: senders, templates, and the fire-and-forget notifier.

pub mod console;
pub mod notifier;
pub mod sender;
pub mod smtp;
pub mod templates;

pub use console::ConsoleEmailSender;
pub use notifier::Notifier;
pub use sender::{EmailSender, MailError, OutgoingEmail};
pub use smtp::{SmtpConfig, SmtpEmailSender};
