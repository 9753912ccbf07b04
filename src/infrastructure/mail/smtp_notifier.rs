//! Email notifier using SMTP over implicit TLS

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::domain::notification::Notifier;
use crate::shared::errors::NotificationError;
use crate::shared::types::EmailConfig;

const AUTH_FAILED_CODE: &str = "535";

pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
            && !self.config.smtp_server.is_empty()
            && !self.config.sender_email.is_empty()
            && !self.config.receiver_email.is_empty()
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message, NotificationError> {
        let sender: Address = self
            .config
            .sender_email
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", self.config.sender_email, e)))?;
        let receiver: Address = self
            .config
            .receiver_email
            .parse()
            .map_err(|e| NotificationError::Address(format!("{}: {}", self.config.receiver_email, e)))?;

        Message::builder()
            .from(Mailbox::new(Some(self.config.sender_name.clone()), sender))
            .to(Mailbox::new(None, receiver))
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| NotificationError::Message(e.to_string()))
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, NotificationError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_server)
            .map_err(|e| NotificationError::Transport(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.sender_email.clone(),
                self.config.authorization_code.clone(),
            ))
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        Ok(transport)
    }
}

fn classify_smtp_error(err: lettre::transport::smtp::Error) -> NotificationError {
    let auth_rejected = err
        .status()
        .map(|code| code.to_string() == AUTH_FAILED_CODE)
        .unwrap_or(false);

    if auth_rejected {
        NotificationError::Authentication(err.to_string())
    } else {
        NotificationError::Transport(err.to_string())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn channel_type(&self) -> &'static str {
        "email"
    }

    async fn notify(&self, subject: &str, body: &str) -> Result<(), NotificationError> {
        if !self.is_enabled() {
            debug!("Email channel disabled, skipping: {}", subject);
            return Err(NotificationError::Disabled);
        }

        let message = self.build_message(subject, body)?;
        let transport = self.build_transport()?;

        match transport.send(message).await {
            Ok(_) => {
                info!(to = %self.config.receiver_email, "Email notification sent: {}", subject);
                Ok(())
            }
            Err(e) => {
                let err = classify_smtp_error(e);
                warn!("Email notification failed: {}", err);
                Err(err)
            }
        }
    }
}
