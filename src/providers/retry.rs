// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded retry with exponential backoff for provider calls
//!
//! Every attempt runs under its own timeout. Transient failures
//! (see [`ProviderError::is_retryable`]) are retried until either the
//! attempt limit or the total budget is spent; anything else fails at once.

use backoff::{backoff::Backoff, ExponentialBackoff};
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::warn;

use super::errors::ProviderError;

/// Terminal failure after the retry loop gave up
#[derive(Debug, Error)]
#[error("{source} (after {attempts} attempt(s))")]
pub struct RetryError {
    pub attempts: usize,
    #[source]
    pub source: ProviderError,
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: bool,
    /// Budget for all attempts and waits together
    pub total_timeout: Duration,
    /// Timeout applied to each individual attempt
    pub attempt_timeout: Duration,
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(20),
            multiplier: 2.0,
            jitter: true,
            total_timeout: Duration::from_secs(180),
            attempt_timeout: Duration::from_secs(60),
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            ..Default::default()
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.total_timeout = timeout;
        self
    }

    /// Tiny delays and no jitter, for tests
    pub fn immediate(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 1.5,
            jitter: false,
            total_timeout: Duration::from_secs(10),
            attempt_timeout: Duration::from_secs(5),
            respect_retry_after: false,
        }
    }

    fn backoff(&self) -> ExponentialBackoff {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.initial_delay,
            max_interval: self.max_delay,
            multiplier: self.multiplier,
            max_elapsed_time: Some(self.total_timeout),
            ..Default::default()
        };

        if !self.jitter {
            backoff.randomization_factor = 0.0;
        }

        backoff.reset();
        backoff
    }

    /// Run `operation` until it succeeds, fails permanently, or the budget
    /// runs out
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, RetryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let timeout_ms = self.attempt_timeout.as_millis() as u64;
        let start = Instant::now();
        let mut backoff = self.backoff();
        let mut attempts = 0;

        loop {
            attempts += 1;

            let result = match tokio::time::timeout(self.attempt_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout { timeout_ms }),
            };

            let error = match result {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_retryable() || attempts >= max_attempts {
                return Err(RetryError {
                    attempts,
                    source: error,
                });
            }

            let suggested = if self.respect_retry_after {
                error
                    .retry_after_secs()
                    .map(|secs| Duration::from_secs(secs).min(self.max_delay))
            } else {
                None
            };

            let delay = match suggested.or_else(|| backoff.next_backoff()) {
                Some(delay) => delay,
                None => {
                    return Err(RetryError {
                        attempts,
                        source: error,
                    })
                }
            };

            if start.elapsed() + delay > self.total_timeout {
                return Err(RetryError {
                    attempts,
                    source: error,
                });
            }

            warn!(
                "Attempt {} failed with retryable error: {}. Retrying in {:?}",
                attempts, error, delay
            );

            tokio::time::sleep(delay).await;
        }
    }
}
