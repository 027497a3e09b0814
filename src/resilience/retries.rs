//! Bounded retry loop.
//!
//! # Responsibilities
//! - Attempt an operation up to `max_attempts` times
//! - Pause between attempts according to the policy, never after the last
//! - Report the last failure once the budget is spent
//! - Compose with credential fallback for calls that take a credential

use std::fmt;
use std::future::Future;
use std::time::Duration;

use thiserror::Error;

use crate::observability::metrics;
use crate::resilience::backoff::{delay_before, DelayStrategy};
use crate::resilience::credentials::{with_fallback, Credential, CredentialSet};

/// Failure after every attempt was used.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    #[error("retry budget exhausted after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } => *attempts,
        }
    }

    pub fn last_error(&self) -> &E {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }

    pub fn into_last_error(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
        }
    }
}

/// How many times to attempt and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub strategy: DelayStrategy,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Fixed delay between attempts.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            strategy: DelayStrategy::Fixed,
            max_delay: delay,
        }
    }

    /// Attempt budget, never less than one.
    pub fn budget(&self) -> u32 {
        self.max_attempts.max(1)
    }

    pub fn delay_before(&self, retry: u32) -> Duration {
        delay_before(self.strategy, retry, self.delay, self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(3, Duration::from_secs(2))
    }
}

/// Runs fallible operations under a [`RetryPolicy`].
#[derive(Debug, Clone)]
pub struct Invoker {
    policy: RetryPolicy,
    label: &'static str,
}

impl Invoker {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            label: "operation",
        }
    }

    /// Name used in logs and metric labels.
    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Attempt `operation` until it succeeds or the budget runs out.
    pub async fn invoke<T, E, F, Fut>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.budget();
        let mut attempt = 0;

        loop {
            attempt += 1;
            metrics::record_attempt(self.label);

            match operation().await {
                Ok(value) => {
                    self.log_success(attempt);
                    return Ok(value);
                }
                Err(err) => self.settle_failure(attempt, max_attempts, err).await?,
            }
        }
    }

    /// Like [`Invoker::invoke`], but each attempt runs through
    /// [`with_fallback`] against `credentials`.
    ///
    /// A credential switch does not use up an attempt. Since a set switches at
    /// most once, the operation runs at most `max_attempts + 1` times.
    pub async fn invoke_with_fallback<T, E, F, Fut>(
        &self,
        credentials: &mut CredentialSet,
        mut operation: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(Credential) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        let max_attempts = self.policy.budget();
        let mut attempt = 0;

        loop {
            attempt += 1;
            metrics::record_attempt(self.label);

            match with_fallback(credentials, &mut operation).await {
                Ok(value) => {
                    self.log_success(attempt);
                    return Ok(value);
                }
                Err(err) => self.settle_failure(attempt, max_attempts, err).await?,
            }
        }
    }

    fn log_success(&self, attempt: u32) {
        if attempt > 1 {
            tracing::info!(operation = self.label, attempt, "Succeeded after retry");
        }
    }

    /// Log a failed attempt, then either wait for the next one or give up.
    async fn settle_failure<E: fmt::Display>(
        &self,
        attempt: u32,
        max_attempts: u32,
        err: E,
    ) -> Result<(), RetryError<E>> {
        metrics::record_failure(self.label);

        if attempt >= max_attempts {
            tracing::error!(
                operation = self.label,
                attempt,
                max_attempts,
                error = %err,
                "Retry budget exhausted"
            );
            return Err(RetryError::Exhausted {
                attempts: attempt,
                last: err,
            });
        }

        let delay = self.policy.delay_before(attempt);
        tracing::warn!(
            operation = self.label,
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Attempt failed, retrying"
        );

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn invoker(max_attempts: u32, delay_ms: u64) -> Invoker {
        Invoker::new(RetryPolicy::fixed(max_attempts, Duration::from_millis(delay_ms)))
    }

    #[tokio::test]
    async fn test_always_failing_is_attempted_exactly_n_times() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = invoker(3, 0)
            .invoke(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("service unavailable") }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempts(), 3);
        assert_eq!(*err.last_error(), "service unavailable");
        assert_eq!(
            err.to_string(),
            "retry budget exhausted after 3 attempts: service unavailable"
        );
    }

    #[tokio::test]
    async fn test_fails_once_then_succeeds() {
        let calls = AtomicU32::new(0);

        let result = invoker(3, 0)
            .invoke(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n == 1 {
                        Err("transient")
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_success_on_last_attempt() {
        let calls = AtomicU32::new(0);

        let result = invoker(4, 0)
            .invoke(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n < 4 { Err("busy") } else { Ok(n) } }
            })
            .await;

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_zero_budget_still_attempts_once() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = invoker(0, 0)
            .invoke(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("nope") }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_attempts_observe_n_minus_one_delays() {
        for n in 1..=5u32 {
            let start = Instant::now();
            let result: Result<(), _> = invoker(n, 1000).invoke(|| async { Err("down") }).await;

            assert_eq!(result.unwrap_err().attempts(), n);
            assert_eq!(start.elapsed(), Duration::from_millis(1000 * (n as u64 - 1)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_success_does_not_sleep() {
        let start = Instant::now();
        let result: Result<_, RetryError<&str>> = invoker(3, 5000).invoke(|| async { Ok(1) }).await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_switch_does_not_consume_an_attempt() {
        let mut creds = CredentialSet::new(Credential::new("primary"))
            .with_secondary(Some(Credential::new("secondary")));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = invoker(3, 0)
            .invoke_with_fallback(&mut creds, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("rejected") }
            })
            .await;

        assert_eq!(result.unwrap_err().attempts(), 3);
        // primary, then secondary once for the switch, then two more retries
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_fallback_success_stops_retrying() {
        let mut creds = CredentialSet::new(Credential::new("primary"))
            .with_secondary(Some(Credential::new("secondary")));
        let calls = AtomicU32::new(0);

        let result = invoker(3, 0)
            .invoke_with_fallback(&mut creds, |cred| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    match cred.expose() {
                        "primary" => Err("quota"),
                        other => Ok(other.to_string()),
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "secondary");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_without_secondary_budget_is_exact() {
        let mut creds = CredentialSet::new(Credential::new("primary"));
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = invoker(2, 0)
            .invoke_with_fallback(&mut creds, |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("rejected") }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
