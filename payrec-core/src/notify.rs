//! Notifier gateway.
//!
//! Outbound alert delivery is at most once, best effort: no retries, no
//! queueing, and a dropped notification is simply lost. Callers discard
//! the result (`let _ = notifier.notify(..)`) so that a delivery failure
//! can never fail the surrounding pipeline.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Errors from notification delivery.
///
/// These exist so tests can observe failures; production call sites
/// discard them.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Endpoint returned a non-success status
    #[error("delivery failed with status {status}: {body}")]
    DeliveryFailed { status: u16, body: String },
}

/// Fire-and-forget alert delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver `text` to the alert channel.
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;
}

struct TelegramTarget {
    bot_token: String,
    chat_id: String,
}

/// Telegram-backed notifier.
///
/// Constructed without a token or chat id it is disabled and `notify`
/// becomes a no-op.
pub struct TelegramNotifier {
    target: Option<TelegramTarget>,
    http: reqwest::Client,
}

impl TelegramNotifier {
    /// Bounds how long a slow endpoint can stall the reconciler, since
    /// the caller awaits delivery before moving to the next event.
    const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

    /// Create a new TelegramNotifier. Missing or empty credentials
    /// produce a disabled notifier.
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Self {
        let target = match (bot_token, chat_id) {
            (Some(bot_token), Some(chat_id)) if !bot_token.is_empty() && !chat_id.is_empty() => {
                Some(TelegramTarget { bot_token, chat_id })
            }
            _ => {
                debug!("Telegram notifier disabled, missing token or chat id");
                None
            }
        };
        Self {
            target,
            http: reqwest::Client::builder()
                .timeout(Self::REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    /// Whether credentials are configured.
    pub fn is_enabled(&self) -> bool {
        self.target.is_some()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let Some(target) = &self.target else {
            return Ok(());
        };

        let url = format!(
            "https://api.telegram.org/bot{}/sendMessage",
            target.bot_token
        );
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": target.chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, "Telegram delivery failed");
            Err(NotifyError::DeliveryFailed {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_notifier_is_a_noop() {
        let notifier = TelegramNotifier::new(None, None);
        assert!(!notifier.is_enabled());
        assert!(notifier.notify("hello").await.is_ok());

        let empty = TelegramNotifier::new(Some(String::new()), Some("123".to_string()));
        assert!(!empty.is_enabled());
        assert!(empty.notify("hello").await.is_ok());
    }

    #[test]
    fn test_configured_notifier_is_enabled() {
        let notifier =
            TelegramNotifier::new(Some("token".to_string()), Some("123".to_string()));
        assert!(notifier.is_enabled());
    }
}
