use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sqlx::PgPool;

use crate::core::config::{MailTransport, Settings};
use crate::core::time::primitive_now_utc;
use crate::db::models::PlatformUser;
use crate::repositories;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MailSender {
    pub(crate) address: String,
    pub(crate) name: String,
}

impl MailSender {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            address: settings.mail().sender_address.clone(),
            name: settings.mail().sender_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutgoingMail {
    pub(crate) recipient: PlatformUser,
    pub(crate) sender: MailSender,
    pub(crate) subject: String,
    pub(crate) body_text: String,
    pub(crate) body_html: String,
}

/// Hands a mail to the platform for delivery. Returning `Ok` means the
/// platform accepted it, not that it reached the inbox.
#[async_trait]
pub(crate) trait Notifier: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

pub(crate) fn notifier_from_settings(
    settings: &Settings,
    pool: &PgPool,
) -> Result<Arc<dyn Notifier>> {
    let notifier: Arc<dyn Notifier> = match settings.mail().transport {
        MailTransport::Outbox => Arc::new(OutboxNotifier::new(pool.clone())),
        MailTransport::Relay => Arc::new(RelayNotifier::from_settings(settings)?),
    };

    tracing::info!(transport = settings.mail().transport.as_str(), "Mail transport configured");
    Ok(notifier)
}

#[derive(Debug, Clone)]
pub(crate) struct OutboxNotifier {
    pool: PgPool,
}

impl OutboxNotifier {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let id = repositories::mail_outbox::enqueue(
            &self.pool,
            repositories::mail_outbox::NewOutboxMail {
                recipient_user_id: &mail.recipient.id,
                recipient_address: &mail.recipient.email,
                sender_address: &mail.sender.address,
                sender_name: &mail.sender.name,
                subject: &mail.subject,
                body_text: &mail.body_text,
                body_html: &mail.body_html,
                created_at: primitive_now_utc(),
            },
        )
        .await
        .context("Failed to enqueue mail in outbox")?;

        tracing::debug!(mail_id = %id, recipient = %mail.recipient.id, "Queued mail");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RelayNotifier {
    client: Client,
    url: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct RelayAddress<'a> {
    address: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    to: RelayAddress<'a>,
    from: RelayAddress<'a>,
    subject: &'a str,
    text: &'a str,
    html: &'a str,
}

impl RelayNotifier {
    pub(crate) fn from_settings(settings: &Settings) -> Result<Self> {
        Self::new(
            &settings.mail().relay_url,
            &settings.mail().relay_token,
            Duration::from_secs(settings.mail().relay_timeout_seconds),
        )
    }

    pub(crate) fn new(url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("Failed to build mail relay HTTP client")?;

        Ok(Self { client, url: url.to_string(), token: token.to_string() })
    }
}

#[async_trait]
impl Notifier for RelayNotifier {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let recipient_name = mail.recipient.display_name();
        let payload = RelayPayload {
            to: RelayAddress { address: &mail.recipient.email, name: &recipient_name },
            from: RelayAddress { address: &mail.sender.address, name: &mail.sender.name },
            subject: &mail.subject,
            text: &mail.body_text,
            html: &mail.body_html,
        };

        let mut request = self.client.post(&self.url).json(&payload);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await.context("Failed to call mail relay")?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Mail relay rejected message (status {status}): {body}");
        }

        Ok(())
    }
}
