//! Token-bucket rate limiter shared by all outbound requests.
//!
//! The limiter is the single arbiter of remote-call pacing: every request,
//! including retries, takes a token before touching the network. It is safe
//! for concurrent use and is handed to the executor as a shared reference,
//! never a process-wide singleton.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::error::TransportError;

/// Default sustained request rate (tokens per second).
const DEFAULT_RATE: f64 = 5.0;
/// Default burst size (bucket capacity).
const DEFAULT_BURST: u32 = 2;

/// Token bucket state. Refilled lazily on each acquisition attempt.
struct TokenBucket {
    tokens: f64,
    capacity: f64,
    refill_rate: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(rate: f64, burst: u32) -> Self {
        let capacity = f64::from(burst.max(1));
        Self {
            tokens: capacity,
            capacity,
            refill_rate: rate,
            last_refill: Instant::now(),
        }
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Takes a token, or returns how long until the next one is due.
    fn try_acquire(&mut self) -> Result<(), Duration> {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            let deficit = 1.0 - self.tokens;
            Err(Duration::from_secs_f64(deficit / self.refill_rate))
        }
    }
}

/// Concurrency-safe token-bucket rate limiter.
pub struct RateLimiter {
    bucket: Mutex<TokenBucket>,
}

impl RateLimiter {
    /// Creates a limiter with the given sustained rate and burst capacity.
    pub fn new(rate: f64, burst: u32) -> Self {
        Self {
            bucket: Mutex::new(TokenBucket::new(rate, burst)),
        }
    }

    /// Creates a limiter with the default limits (5 req/s, burst 2).
    pub fn default_limits() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_BURST)
    }

    /// Acquires a token, waiting as long as necessary.
    ///
    /// The wait observes `cancel` and returns promptly once cancelled.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), TransportError> {
        loop {
            let wait = {
                let mut bucket = self.bucket.lock().await;
                bucket.try_acquire()
            };
            match wait {
                Ok(()) => {
                    trace!("rate limit token acquired");
                    return Ok(());
                }
                Err(wait) => {
                    trace!(wait_ms = wait.as_millis() as u64, "rate limited, waiting");
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
            }
        }
    }
}
