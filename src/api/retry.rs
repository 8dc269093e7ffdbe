//! Bounded retry with backoff and jitter around classification calls.

use std::time::Duration;

use rand::RngExt;

use crate::api::limit::{Clock, RateLimiter};
use crate::error::SpritesortError;

/// Retry policy for a single classification request.
///
/// Every attempt (including the first) pays the rate limit. Quota errors
/// back off by the larger of the server-suggested delay and the default,
/// plus uniform jitter so independent clients do not retry in lockstep;
/// every other failure waits a fixed short delay.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub transient_delay: Duration,
    pub default_quota_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            transient_delay: Duration::from_secs(2),
            default_quota_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Run `classify` until it succeeds or the attempt bound is reached.
    ///
    /// Returns `RetriesExhausted` wrapping the last observed error once the
    /// bound is hit. Backoff sleeps go through the limiter's clock so tests
    /// can observe them.
    pub fn attempt<C, F>(
        &self,
        limiter: &mut RateLimiter<C>,
        mut classify: F,
    ) -> Result<String, SpritesortError>
    where
        C: Clock,
        F: FnMut() -> Result<String, SpritesortError>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            limiter.acquire();

            let err = match classify() {
                Ok(text) => return Ok(text),
                Err(err) => err,
            };

            if attempt >= self.max_attempts {
                return Err(SpritesortError::RetriesExhausted {
                    attempts: attempt,
                    source: Box::new(err),
                });
            }

            let delay = if err.is_quota_exceeded() {
                self.quota_backoff(err.suggested_retry_after())
            } else {
                self.transient_delay
            };
            limiter.clock().sleep(delay);
        }
    }

    /// `max(server_suggested, default) + uniform(0.5s..=1.5s)`.
    fn quota_backoff(&self, retry_after: Option<f64>) -> Duration {
        let suggested = retry_after
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
            .unwrap_or(Duration::ZERO);
        let base = suggested.max(self.default_quota_delay);
        let jitter = rand::rng().random_range(0.5..=1.5);
        base + Duration::from_secs_f64(jitter)
    }
}
