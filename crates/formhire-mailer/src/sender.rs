use std::sync::Arc;

/// A rendered plain-text email, ready to hand to a sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address {address}: {reason}")]
    Address { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Blocking email delivery. Implementations are called from a blocking
/// worker thread, never on the async runtime.
pub trait EmailSender: Send + Sync {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

impl EmailSender for Box<dyn EmailSender> {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        (**self).send(email)
    }
}

impl<T: EmailSender + ?Sized> EmailSender for Arc<T> {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        (**self).send(email)
    }
}
