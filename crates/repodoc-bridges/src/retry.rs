// SPDX-License-Identifier: AGPL-3.0-or-later
//! Bounded exponential back-off for upstream calls

use crate::{BridgeError, Result};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// How often and how patiently to retry a transient failure
///
/// The wait before attempt `n + 1` is `multiplier * 2^(n - 1)`, clamped
/// into `min_wait..=max_wait`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub multiplier: Duration,
    pub min_wait: Duration,
    pub max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: Duration::from_secs(1),
            min_wait: Duration::from_secs(4),
            max_wait: Duration::from_secs(10),
        }
    }
}

/// `[retry]` table of a config file, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub multiplier_secs: u64,
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier_secs: 1,
            min_wait_secs: 4,
            max_wait_secs: 10,
        }
    }
}

impl From<RetrySettings> for RetryPolicy {
    fn from(settings: RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            multiplier: Duration::from_secs(settings.multiplier_secs),
            min_wait: Duration::from_secs(settings.min_wait_secs),
            max_wait: Duration::from_secs(settings.max_wait_secs.max(settings.min_wait_secs)),
        }
    }
}

impl RetryPolicy {
    /// Same attempt count, no waiting
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            multiplier: Duration::ZERO,
            min_wait: Duration::ZERO,
            max_wait: Duration::ZERO,
        }
    }

    /// Wait after the `attempt`-th failure (1-based)
    pub fn wait_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.multiplier
            .saturating_mul(factor)
            .max(self.min_wait)
            .min(self.max_wait)
    }

    /// Run `call` until it succeeds, fails permanently, or attempts run out
    ///
    /// Exhausted transient failures come back as
    /// [`BridgeError::UpstreamUnavailable`] wrapping the last error.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match call().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(err),
                Err(err) => err,
            };

            if attempt >= self.max_attempts {
                tracing::error!(operation, attempts = attempt, error = %err, "giving up");
                return Err(BridgeError::UpstreamUnavailable {
                    operation,
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let wait = self.wait_after(attempt);
            tracing::warn!(
                operation,
                attempt,
                wait_ms = wait.as_millis() as u64,
                error = %err,
                "retrying"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;

    fn flaky(status: u16) -> BridgeError {
        BridgeError::Http {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn test_default_waits() {
        let policy = RetryPolicy::default();
        let secs: Vec<u64> = (1..=5).map(|n| policy.wait_after(n).as_secs()).collect();
        assert_eq!(secs, vec![4, 4, 4, 8, 10]);
    }

    #[test]
    fn test_settings_convert() {
        let policy = RetryPolicy::from(RetrySettings {
            max_attempts: 0,
            multiplier_secs: 2,
            min_wait_secs: 1,
            max_wait_secs: 0,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.max_wait, Duration::from_secs(1));
        assert_eq!(policy.wait_after(3), Duration::from_secs(1));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let calls = Cell::new(0);
        let result = tokio_test::block_on(RetryPolicy::immediate(3).run("probe", || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err(flaky(500))
                } else {
                    Ok(n)
                }
            }
        }));
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn test_exhaustion_is_upstream_unavailable() {
        let calls = Cell::new(0);
        let result: Result<()> = tokio_test::block_on(RetryPolicy::immediate(3).run("probe", || {
            calls.set(calls.get() + 1);
            async { Err(flaky(503)) }
        }));
        assert_eq!(calls.get(), 3);
        match result.unwrap_err() {
            BridgeError::UpstreamUnavailable {
                operation,
                attempts,
                last,
            } => {
                assert_eq!(operation, "probe");
                assert_eq!(attempts, 3);
                assert!(matches!(*last, BridgeError::Http { status: 503, .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = tokio_test::block_on(RetryPolicy::immediate(3).run("probe", || {
            calls.set(calls.get() + 1);
            async { Err(BridgeError::Decode("bad json".into())) }
        }));
        assert_eq!(calls.get(), 1);
        assert!(matches!(result, Err(BridgeError::Decode(_))));
    }
}
