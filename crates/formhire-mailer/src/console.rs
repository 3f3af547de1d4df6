//! Console sender for development: logs instead of delivering.

use crate::sender::{EmailSender, MailError, OutgoingEmail};

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleEmailSender;

impl ConsoleEmailSender {
    pub fn new() -> Self {
        Self
    }
}

impl EmailSender for ConsoleEmailSender {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            to = %email.to.join(", "),
            subject = %email.subject,
            "Email (console sender)\n{}",
            email.body
        );
        Ok(())
    }
}
