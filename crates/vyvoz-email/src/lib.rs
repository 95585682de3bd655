// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP mail adapter for the Vyvoz intake bot.
//!
//! Sends plain-text notifications over STARTTLS. Only the `vyvoz mail`
//! subcommand uses it; the dialogue never sends mail on its own.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};
use vyvoz_config::model::MailConfig;
use vyvoz_core::{AdapterType, HealthStatus, MailAdapter, PluginAdapter, VyvozError};

/// SMTP sender implementing [`MailAdapter`].
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, VyvozError> {
        let from = sender(config)?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| VyvozError::Config(format!("invalid mail.smtp_host: {e}")))?
            .port(config.smtp_port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        info!(
            host = config.smtp_host.as_str(),
            port = config.smtp_port,
            "smtp mailer initialized"
        );
        Ok(Self {
            transport: builder.build(),
            from,
        })
    }
}

/// The sender mailbox: `mail.from`, falling back to `mail.username`.
fn sender(config: &MailConfig) -> Result<Mailbox, VyvozError> {
    let address = config
        .from
        .as_deref()
        .or(config.username.as_deref())
        .ok_or_else(|| VyvozError::Config("mail.from or mail.username must be set".into()))?;
    address
        .parse()
        .map_err(|e| VyvozError::Config(format!("invalid sender address {address}: {e}")))
}

/// Subject line stamped with the local send time.
pub fn subject(now: DateTime<Local>) -> String {
    format!(
        "Новое обращение принято ботом {}",
        now.format("%Y-%m-%d %H:%M")
    )
}

/// Builds the plain-text message.
pub fn build_message(
    from: &Mailbox,
    body: &str,
    recipient: &str,
    now: DateTime<Local>,
) -> Result<Message, VyvozError> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|e| VyvozError::sink("mail", format!("invalid recipient {recipient}: {e}")))?;
    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(subject(now))
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| VyvozError::Sink {
            sink: "mail".into(),
            message: format!("failed to build message: {e}"),
            source: Some(Box::new(e)),
        })
}

#[async_trait]
impl PluginAdapter for SmtpMailer {
    fn name(&self) -> &str {
        "smtp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Mail
    }

    async fn health_check(&self) -> Result<HealthStatus, VyvozError> {
        match self.transport.test_connection().await {
            Ok(true) => Ok(HealthStatus::Healthy),
            Ok(false) => Ok(HealthStatus::Degraded("SMTP server rejected NOOP".into())),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), VyvozError> {
        Ok(())
    }
}

#[async_trait]
impl MailAdapter for SmtpMailer {
    async fn send(&self, body: &str, recipient: &str) -> Result<(), VyvozError> {
        let message = build_message(&self.from, body, recipient, Local::now())?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| VyvozError::Sink {
                sink: "mail".into(),
                message: format!("SMTP send failed: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(code = %response.code(), recipient, "mail accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 1, 14, 5, 0).unwrap()
    }

    #[test]
    fn subject_carries_timestamp() {
        assert_eq!(subject(now()), "Новое обращение принято ботом 2026-03-01 14:05");
    }

    #[test]
    fn sender_prefers_from_over_username() {
        let config = MailConfig {
            username: Some("bot@yandex.ru".into()),
            from: Some("Vyvoz <noreply@example.ru>".into()),
            ..MailConfig::default()
        };
        assert_eq!(sender(&config).unwrap().email.to_string(), "noreply@example.ru");

        let config = MailConfig {
            username: Some("bot@yandex.ru".into()),
            ..MailConfig::default()
        };
        assert_eq!(sender(&config).unwrap().email.to_string(), "bot@yandex.ru");
    }

    #[test]
    fn missing_sender_is_a_config_error() {
        let err = SmtpMailer::from_config(&MailConfig::default())
            .err()
            .expect("sender required");
        assert!(matches!(err, VyvozError::Config(_)));
    }

    #[test]
    fn message_has_headers_and_body() {
        let from: Mailbox = "bot@yandex.ru".parse().unwrap();
        let message = build_message(&from, "Жалоба принята", "ops@example.ru", now()).unwrap();
        let headers = message.headers();
        assert_eq!(headers.get_raw("To"), Some("ops@example.ru"));
        assert_eq!(
            headers.get_raw("Subject"),
            Some("Новое обращение принято ботом 2026-03-01 14:05")
        );
        let formatted = String::from_utf8_lossy(&message.formatted()).into_owned();
        assert!(formatted.contains("text/plain"));
    }

    #[test]
    fn invalid_recipient_is_rejected() {
        let from: Mailbox = "bot@yandex.ru".parse().unwrap();
        assert!(build_message(&from, "x", "not an address", now()).is_err());
    }
}
