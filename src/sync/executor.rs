//! Resilient request execution: rate limiting, bounded retry, backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::error::TransportError;
use super::limiter::RateLimiter;
use super::transport::{RequestTemplate, Transport};

/// Total attempts per request (one initial plus three retries).
const MAX_ATTEMPTS: u32 = 4;
/// Base unit of the linear backoff: attempt n waits n times this.
const BASE_DELAY: Duration = Duration::from_secs(1);

/// Executes requests against the transport with retry on transient
/// network failures.
///
/// HTTP responses are never retried here, whatever their status. A service
/// that answers is deterministically refusing the request; only failures
/// that never produced a response get another attempt.
pub struct RequestExecutor {
    transport: Transport,
    limiter: Arc<RateLimiter>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RequestExecutor {
    pub fn new(transport: Transport, limiter: Arc<RateLimiter>) -> Self {
        Self {
            transport,
            limiter,
            max_attempts: MAX_ATTEMPTS,
            base_delay: BASE_DELAY,
        }
    }

    /// Overrides the backoff base delay. Intended for tests.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Executes `template`, retrying retryable transport failures with a
    /// linearly increasing backoff.
    ///
    /// Every attempt first takes a rate-limiter token and sends a fresh
    /// copy of the buffered body. Token waits and backoff waits both
    /// observe `cancel`.
    pub async fn execute(
        &self,
        template: &RequestTemplate,
        cancel: &CancellationToken,
    ) -> Result<reqwest::Response, TransportError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.limiter.acquire(cancel).await?;
            if cancel.is_cancelled() {
                return Err(TransportError::Cancelled);
            }

            let err = match self.transport.send(template).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                warn!(
                    attempts = attempt,
                    error = %err,
                    url = %template.url,
                    "giving up after repeated transport failures"
                );
                return Err(TransportError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.base_delay * attempt;
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "transport failure, retrying"
            );
            tokio::select! {
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
