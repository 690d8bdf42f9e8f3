//! Upgrade-complete notifications.
//!
//! Supports multiple notifiers:
//! - Chat: posts to a channel through the chat platform's REST API
//! - Log: writes completions to the log only
//! - Memory: keeps completions in memory (tests, dry runs)

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::planets::Completion;

/// Errors that can occur while delivering notifications.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{failed} of {total} notifications failed")]
    Incomplete { failed: usize, total: usize },
}

/// Trait for notification sinks.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Notifier name for logging.
    fn name(&self) -> &'static str;

    /// Deliver one message per completion.
    async fn notify(&self, completions: &[Completion]) -> Result<(), NotifyError>;
}

/// Logs completions instead of sending them anywhere.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, completions: &[Completion]) -> Result<(), NotifyError> {
        for completion in completions {
            info!(player = %completion.player_id, "{}", completion.message());
        }
        Ok(())
    }
}

/// Collects completions in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    sent: Mutex<Vec<Completion>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far.
    pub fn sent(&self) -> Vec<Completion> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn notify(&self, completions: &[Completion]) -> Result<(), NotifyError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.extend_from_slice(completions);
        }
        Ok(())
    }
}

/// Mention filter so only the intended player is pinged.
#[derive(Debug, Serialize, PartialEq)]
struct AllowedMentions {
    parse: Vec<String>,
    users: Vec<String>,
}

/// Chat "create message" request body.
#[derive(Debug, Serialize, PartialEq)]
struct CreateMessage {
    content: String,
    allowed_mentions: AllowedMentions,
}

impl CreateMessage {
    fn for_completion(completion: &Completion) -> Self {
        let users = if completion.ping {
            vec![completion.player_id.clone()]
        } else {
            Vec::new()
        };
        Self {
            content: completion.message(),
            allowed_mentions: AllowedMentions {
                parse: Vec::new(),
                users,
            },
        }
    }
}

/// Posts completions to a chat channel.
pub struct ChatNotifier {
    client: reqwest::Client,
    endpoint: Url,
}

impl ChatNotifier {
    /// Build a notifier posting to `{api_base}/channels/{channel_id}/messages`
    /// authenticated with the bot `token`.
    pub fn new(
        api_base: &Url,
        channel_id: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bot {}", token))
            .map_err(|e| NotifyError::InvalidCredential(e.to_string()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Self::with_client(client, api_base, channel_id)
    }

    /// Use a preconfigured client.
    pub fn with_client(
        client: reqwest::Client,
        api_base: &Url,
        channel_id: &str,
    ) -> Result<Self, NotifyError> {
        let endpoint = message_endpoint(api_base, channel_id)?;
        Ok(Self { client, endpoint })
    }

    async fn post(&self, completion: &Completion) -> Result<(), NotifyError> {
        let body = CreateMessage::for_completion(completion);
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

fn message_endpoint(api_base: &Url, channel_id: &str) -> Result<Url, url::ParseError> {
    let base = api_base.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/channels/{}/messages", base, channel_id))
}

#[async_trait]
impl Notifier for ChatNotifier {
    fn name(&self) -> &'static str {
        "chat"
    }

    async fn notify(&self, completions: &[Completion]) -> Result<(), NotifyError> {
        let mut failed = 0;
        for completion in completions {
            match self.post(completion).await {
                Ok(()) => debug!("Posted completion for player {}", completion.player_id),
                Err(e) => {
                    warn!(
                        "Failed to post completion for player {}: {}",
                        completion.player_id, e
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(NotifyError::Incomplete {
                failed,
                total: completions.len(),
            });
        }
        Ok(())
    }
}
