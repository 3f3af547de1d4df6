//! SMTP sender for production.

use lettre::message::header::ContentType;
use lettre::message::{Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{SmtpTransport, Transport};

use crate::sender::{EmailSender, MailError, OutgoingEmail};

/// Implicit-TLS port; every other port negotiates STARTTLS.
const SMTPS_PORT: u16 = 465;

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// 465 for implicit TLS, 587 (default) for STARTTLS
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: Option<String>,
}

impl SmtpConfig {
    /// Read `SMTP_*` variables. Returns `None` if any of `SMTP_HOST`,
    /// `SMTP_USERNAME`, `SMTP_PASSWORD` or `SMTP_FROM_EMAIL` is missing.
    pub fn from_env() -> Option<Self> {
        fn get_env(key: &str) -> Option<String> {
            std::env::var(key).ok().filter(|s| !s.trim().is_empty())
        }

        let host = get_env("SMTP_HOST")?;
        let username = get_env("SMTP_USERNAME")?;
        let password = get_env("SMTP_PASSWORD")?;
        let from_email = get_env("SMTP_FROM_EMAIL")?;

        let port = get_env("SMTP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        Some(Self {
            host,
            port,
            username,
            password,
            from_email,
            from_name: get_env("SMTP_FROM_NAME"),
        })
    }
}

pub struct SmtpEmailSender {
    transport: SmtpTransport,
    from: Mailbox,
}

impl SmtpEmailSender {
    /// Build the transport and check the server answers.
    pub fn new(config: SmtpConfig) -> Result<Self, MailError> {
        let from = mailbox(&config.from_email, config.from_name.clone())?;
        let creds = Credentials::new(config.username, config.password);

        let builder = if config.port == SMTPS_PORT {
            SmtpTransport::relay(&config.host)
        } else {
            SmtpTransport::starttls_relay(&config.host)
        }
        .map_err(|e| MailError::Transport(format!("failed to create SMTP transport: {}", e)))?;

        let transport = builder.port(config.port).credentials(creds).build();

        transport
            .test_connection()
            .map_err(|e| MailError::Transport(format!("SMTP connection test failed: {}", e)))?;

        tracing::info!(host = %config.host, port = config.port, "SMTP connection established");

        Ok(Self { transport, from })
    }
}

fn mailbox(address: &str, name: Option<String>) -> Result<Mailbox, MailError> {
    let email = address.parse().map_err(|e: lettre::address::AddressError| MailError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })?;
    Ok(Mailbox::new(name, email))
}

/// Parse every recipient, skipping malformed ones so one bad entry does not
/// cost the rest their copy. Fails only when nobody is left.
fn recipients(addresses: &[String]) -> Result<Vec<Mailbox>, MailError> {
    let mut valid = Vec::with_capacity(addresses.len());
    let mut last_error = None;
    for address in addresses {
        match mailbox(address, None) {
            Ok(mailbox) => valid.push(mailbox),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping recipient");
                last_error = Some(e);
            }
        }
    }

    match (valid.is_empty(), last_error) {
        (true, Some(e)) => Err(e),
        (true, None) => Err(MailError::Build("no recipients".into())),
        (false, _) => Ok(valid),
    }
}

impl EmailSender for SmtpEmailSender {
    fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject.clone())
            .header(ContentType::TEXT_PLAIN);
        for to in recipients(&email.to)? {
            builder = builder.to(to);
        }

        let message = builder
            .body(email.body.clone())
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|e| MailError::Transport(e.to_string()))?;

        tracing::info!(to = %email.to.join(", "), subject = %email.subject, "Email sent");
        Ok(())
    }
}
