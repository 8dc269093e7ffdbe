//! Client-side request spacing for a quota-bound API.

use std::time::{Duration, Instant};

/// Time source abstraction so the limiter and retry backoff are testable
/// without real sleeps.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// Wall-clock implementation used by the real pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Enforces a minimum wall-clock interval between outbound requests.
///
/// One instance lives for the whole run; the pipeline is sequential, so no
/// locking is needed around the last-request instant.
#[derive(Debug)]
pub struct RateLimiter<C: Clock = SystemClock> {
    min_interval: Duration,
    last_request: Option<Instant>,
    clock: C,
}

impl RateLimiter<SystemClock> {
    /// Derive the minimum spacing from a requests-per-minute quota
    /// (15/min -> 4 s between requests).
    pub fn from_quota(requests_per_minute: u32) -> Self {
        let per_minute = requests_per_minute.max(1);
        Self::with_clock(Duration::from_secs_f64(60.0 / f64::from(per_minute)), SystemClock)
    }
}

impl<C: Clock> RateLimiter<C> {
    pub fn with_clock(min_interval: Duration, clock: C) -> Self {
        Self {
            min_interval,
            last_request: None,
            clock,
        }
    }

    /// Block until at least the minimum interval has passed since the
    /// previous acquisition, then record the new last-request instant.
    /// The first acquisition passes immediately.
    pub fn acquire(&mut self) {
        if let Some(last) = self.last_request {
            let elapsed = self.clock.now().saturating_duration_since(last);
            if elapsed < self.min_interval {
                self.clock.sleep(self.min_interval - elapsed);
            }
        }
        self.last_request = Some(self.clock.now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
