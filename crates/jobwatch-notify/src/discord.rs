//! Discord webhook sink.

use std::time::Duration;

use jobwatch_core::{Announcement, Destination, NotificationSink};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::error::NotifyError;
use crate::render::{gig_payload, job_payload, WebhookPayload};

const DEFAULT_BACKOFF_BASE_MS: u64 = 500;
const MAX_DELAY_MS: u64 = 60_000;

/// Posts announcements to the Discord webhook URL held by each [`Destination`].
///
/// Rate limits (429) wait for Discord's `retry_after`; 5xx and transport
/// errors back off exponentially with jitter. Other 4xx responses fail
/// immediately. `max_retries` counts attempts after the first.
#[derive(Clone)]
pub struct DiscordWebhookSink {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Deserialize)]
struct RateLimitBody {
    retry_after: f64,
}

impl DiscordWebhookSink {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, max_retries: u32) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
        })
    }

    #[must_use]
    pub fn with_backoff_base_ms(mut self, backoff_base_ms: u64) -> Self {
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Posts `payload` to `webhook_url`, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last [`NotifyError`] once retries are exhausted, or
    /// [`NotifyError::Rejected`] immediately for a non-429 4xx.
    pub async fn post(&self, webhook_url: &str, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let mut attempt = 0u32;
        loop {
            let (err, delay_ms) = match self.post_once(webhook_url, payload).await {
                Ok(()) => return Ok(()),
                Err(err @ NotifyError::RateLimited { retry_after_ms }) => (err, retry_after_ms),
                Err(err @ NotifyError::Rejected { status, .. }) if status < 500 => return Err(err),
                Err(err) => (err, self.backoff_delay_ms(attempt)),
            };
            if attempt >= self.max_retries {
                return Err(err);
            }
            let delay_ms = delay_ms.min(MAX_DELAY_MS);
            tracing::warn!(
                attempt,
                max_retries = self.max_retries,
                delay_ms,
                error = %err,
                "notify: webhook delivery failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            attempt += 1;
        }
    }

    async fn post_once(&self, webhook_url: &str, payload: &WebhookPayload) -> Result<(), NotifyError> {
        let response = self.client.post(webhook_url).json(payload).send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(());
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let header_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<f64>().ok());
            let body = response.text().await.unwrap_or_default();
            let body_secs = serde_json::from_str::<RateLimitBody>(&body)
                .ok()
                .map(|b| b.retry_after);
            let secs = body_secs.or(header_secs).unwrap_or(1.0).max(0.0);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let retry_after_ms = (secs * 1000.0).ceil() as u64;
            return Err(NotifyError::RateLimited { retry_after_ms });
        }

        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// `backoff_base_ms * 2^attempt` with ±25 % jitter.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        let computed = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.min(10))
            .min(MAX_DELAY_MS);
        (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64
    }
}

impl NotificationSink for DiscordWebhookSink {
    type Error = NotifyError;

    async fn send(
        &self,
        destination: &Destination,
        announcement: &Announcement,
    ) -> Result<(), NotifyError> {
        let payload = match announcement {
            Announcement::Job(job) => job_payload(job),
            Announcement::Gig(gig) => gig_payload(gig),
        };
        self.post(destination.as_str(), &payload).await
    }
}
