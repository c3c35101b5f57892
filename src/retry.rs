//! Bounded retry with randomized exponential backoff.
//!
//! The wait before attempt `k` (for `k >= 2`) is drawn uniformly from
//! `[min_delay, min(max_delay, base * 2^(k-1))]`. With the defaults
//! (base = min = 1s, max = 60s, 6 attempts) the worst case sleeps
//! 2 + 4 + 8 + 16 + 32 = 62 seconds before giving up.

use crate::error::{Error, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base: Duration,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            base: Duration::from_secs(1),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        base: Duration,
        min_delay: Duration,
        max_delay: Duration,
    ) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        if min_delay > max_delay {
            return Err(Error::Config(format!(
                "min delay {min_delay:?} exceeds max delay {max_delay:?}"
            )));
        }
        Ok(Self {
            max_attempts,
            base,
            min_delay,
            max_delay,
        })
    }

    /// Same policy with a different attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".to_string()));
        }
        self.max_attempts = max_attempts;
        Ok(self)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Inclusive range the wait before `attempt` is drawn from.
    ///
    /// The first attempt never waits, so `attempt <= 1` yields a zero range.
    pub fn bounds(&self, attempt: u32) -> (Duration, Duration) {
        if attempt <= 1 {
            return (Duration::ZERO, Duration::ZERO);
        }
        let exp = self.base.as_secs_f64() * 2f64.powi((attempt - 1).min(64) as i32);
        let upper = Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()));
        (self.min_delay, upper.max(self.min_delay))
    }

    /// Draw the wait before `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let (lo, hi) = self.bounds(attempt);
        if lo == hi {
            return lo;
        }
        let secs = rand::thread_rng().gen_range(lo.as_secs_f64()..=hi.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number. On exhaustion the last
    /// error is wrapped in [`Error::Call`].
    pub async fn retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= self.max_attempts => {
                    error!(what, attempts = attempt, error = %e, "retries exhausted");
                    return Err(Error::Call {
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.backoff(attempt + 1);
                    warn!(
                        what,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "attempt failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
