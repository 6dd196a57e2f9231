//! Bounded retry of a whole request/response exchange.

use std::time::Duration;

use tracing::warn;

use crate::{SensorError, SensorResult};

/// Attempts made for a value query before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u8 = 10;

/// Retry policy for value queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first. Zero is treated as one.
    pub max_attempts: u8,
    /// Base delay between attempts in milliseconds (doubles each retry, capped at 8x).
    pub base_delay_ms: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: 0,
        }
    }
}

/// Position of one attempt within a [`RetryPolicy::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    /// 1-based attempt number.
    pub number: u8,
    pub max_attempts: u8,
}

impl Attempt {
    pub fn is_last(&self) -> bool {
        self.number >= self.max_attempts
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u8) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_base_delay_ms(mut self, base_delay_ms: u32) -> Self {
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Delay before retry number `retry` (0-indexed).
    pub fn delay_for(&self, retry: u8) -> Duration {
        let shift = u32::from(retry.min(3));
        Duration::from_millis(u64::from(self.base_delay_ms.saturating_mul(1 << shift)))
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// attempts run out. The last error is returned on exhaustion.
    pub fn run<T, F>(&self, mut op: F) -> SensorResult<T>
    where
        F: FnMut(Attempt) -> SensorResult<T>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut number = 1;
        loop {
            let attempt = Attempt {
                number,
                max_attempts,
            };
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && !attempt.is_last() => {
                    warn!(
                        attempt = attempt.number,
                        max_attempts,
                        error = %error,
                        "attempt failed, retrying"
                    );
                    let delay = self.delay_for(number - 1);
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    number += 1;
                }
                Err(error) => return Err(final_error(error, attempt)),
            }
        }
    }
}

fn final_error(error: SensorError, attempt: Attempt) -> SensorError {
    if error.is_retryable() {
        warn!(
            attempts = attempt.number,
            error = %error,
            "giving up"
        );
    }
    error
}
