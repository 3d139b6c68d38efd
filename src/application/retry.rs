//! Bounded retry with exponential backoff.
//!
//! [`RetryPolicy`] is applied to any async brokerage call that can either
//! decline (`Ok(None)`) or fault (`Err`). Both outcomes are retried the same
//! way. Between attempt `i` and `i + 1` the policy sleeps
//! `base_delay * multiplier^(i - 1)`; there is no sleep after the final
//! attempt. The result is a tagged [`RetryOutcome`]; errors never escape.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, warn};

use crate::error::BrokerError;

/// Retry and backoff settings for brokerage calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay after the first failed attempt (milliseconds).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Multiplier applied to the delay after each further failure.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Upper bound on a single attempt (milliseconds). `None` waits as long
    /// as the backend takes.
    #[serde(default)]
    pub attempt_timeout_ms: Option<u64>,
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            attempt_timeout_ms: None,
        }
    }
}

/// Why the last attempt of an exhausted call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The backend answered with an operation-level failure.
    Declined,
    /// The backend raised a fault or the attempt timed out.
    Fault(BrokerError),
}

/// Tagged result of a retried call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T> {
    Succeeded { value: T, attempts: u32 },
    Exhausted { attempts: u32, last_failure: AttemptFailure },
}

impl<T> RetryOutcome<T> {
    /// Number of attempts made.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Succeeded { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Collapse to the sentinel form callers hand to users.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Succeeded { value, .. } => Some(value),
            Self::Exhausted { .. } => None,
        }
    }
}

impl RetryPolicy {
    /// Fixed policy with no delay, for tests and dry runs.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
            backoff_multiplier: 1.0,
            attempt_timeout_ms: None,
        }
    }

    /// Sleep between attempt `attempt` and `attempt + 1` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        if !millis.is_finite() || millis <= 0.0 {
            return Duration::ZERO;
        }
        Duration::from_millis(millis.round() as u64)
    }

    fn attempt_limit(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Run `op` until it succeeds or the attempt budget is spent.
    ///
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut op: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<Option<T>, BrokerError>>,
    {
        let limit = self.attempt_limit();
        let mut attempt = 1;

        loop {
            let result = match self.attempt_timeout_ms {
                Some(millis) => match timeout(Duration::from_millis(millis), op(attempt)).await {
                    Ok(result) => result,
                    Err(_) => Err(BrokerError::Timeout { millis }),
                },
                None => op(attempt).await,
            };

            let failure = match result {
                Ok(Some(value)) => {
                    debug!(operation, attempt, "Brokerage call succeeded");
                    return RetryOutcome::Succeeded {
                        value,
                        attempts: attempt,
                    };
                }
                Ok(None) => {
                    warn!(operation, attempt, "Brokerage call failed");
                    AttemptFailure::Declined
                }
                Err(err) => {
                    warn!(operation, attempt, error = %err, "Brokerage call raised");
                    AttemptFailure::Fault(err)
                }
            };

            if attempt >= limit {
                error!(
                    operation,
                    attempts = attempt,
                    "Brokerage call failed after all retry attempts"
                );
                return RetryOutcome::Exhausted {
                    attempts: attempt,
                    last_failure: failure,
                };
            }

            let delay = self.delay_for(attempt);
            debug!(
                operation,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "Backing off before retry"
            );
            sleep(delay).await;
            attempt += 1;
        }
    }
}
