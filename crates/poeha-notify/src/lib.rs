//! Home Assistant event delivery.
//!
//! Provides:
//! - [`Client`]: posts a [`Notification`] to `/api/events/<name>` with a
//!   long-lived access token
//! - [`Notifier`]: a bounded background queue in front of the client that
//!   the dispatcher can hand events to without waiting on the network

use std::fmt;
use std::time::Duration;

use poeha_core::{EventName, Notification};
use thiserror::Error;

mod worker;

pub use worker::{DEFAULT_QUEUE_CAPACITY, Notifier, WorkerStats, spawn};

/// Default request timeout for webhook calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const EVENTS_PATH: &str = "api/events";
/// Error bodies are cut to this many bytes before being logged.
const MAX_ERROR_BODY: usize = 200;

/// Webhook delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The access token was invalid.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: &'static str },
    /// The Home Assistant address was invalid.
    #[error("invalid Home Assistant address: {reason}")]
    InvalidAddress { reason: &'static str },
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Home Assistant answered with a non-success status.
    #[error("Home Assistant returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Home Assistant events API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client for `address` (`host:port` or a full `http(s)://` URL).
    ///
    /// # Errors
    ///
    /// Returns an error if the address or token is empty or whitespace-only,
    /// or if the HTTP client fails to build.
    pub fn new(address: &str, token: impl Into<String>) -> Result<Self, NotifyError> {
        let token = token.into();

        if token.is_empty() {
            return Err(NotifyError::InvalidToken {
                reason: "token cannot be empty",
            });
        }
        if token.trim().is_empty() {
            return Err(NotifyError::InvalidToken {
                reason: "token cannot be whitespace-only",
            });
        }

        let base_url = base_url(address)?;

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(NotifyError::ClientBuild)?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Full URL events named `event` are posted to.
    pub fn event_url(&self, event: EventName) -> String {
        format!("{}/{EVENTS_PATH}/{event}", self.base_url)
    }

    /// Fires one event. A single attempt; no retries.
    pub async fn send_event(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(self.event_url(notification.event))
            .bearer_auth(&self.token)
            .json(&notification.payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(NotifyError::Status { status, body });
        }

        Ok(())
    }
}

fn base_url(address: &str) -> Result<String, NotifyError> {
    let address = address.trim().trim_end_matches('/');
    if address.is_empty() {
        return Err(NotifyError::InvalidAddress {
            reason: "address cannot be empty",
        });
    }
    if address.contains("://") {
        if !(address.starts_with("http://") || address.starts_with("https://")) {
            return Err(NotifyError::InvalidAddress {
                reason: "only http and https are supported",
            });
        }
        return Ok(address.to_string());
    }
    Ok(format!("http://{address}"))
}

fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
}
