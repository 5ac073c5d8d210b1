//! Retry policy and the retrying chain handler.

use std::time::Duration;

use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{Request, RequestError, Response, ResponseStream, TransportError};

use super::{Handler, HandlerFuture, Next};

/// Configuration for exponential backoff retry behavior.
///
/// Controls how many times to retry a failed attempt, how long to wait
/// between attempts, and which HTTP statuses count as transient. Stateless
/// between requests; configured once and shared read-only across concurrent
/// calls.
///
/// # Defaults
///
/// - `max_attempts`: 3
/// - `initial_delay`: 5 seconds
/// - `max_delay`: 60 seconds
/// - `multiplier`: 2.0
/// - retryable statuses: all 5xx, plus 429 and 408
///
/// # Example
///
/// ```
/// use salad_transcribe::chain::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new()
///     .with_max_attempts(5)
///     .with_initial_delay(Duration::from_secs(1))
///     .with_max_delay(Duration::from_secs(30))
///     .with_multiplier(1.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    ///
    /// A value of 1 means no retries; only the initial attempt is made.
    pub max_attempts: u32,

    /// Delay before the first retry.
    ///
    /// Subsequent delays are computed by multiplying by `multiplier`.
    pub initial_delay: Duration,

    /// Maximum delay between retries.
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Non-5xx statuses treated as transient.
    ///
    /// Server errors (5xx) are always retryable regardless of this list.
    pub retryable_statuses: Vec<http::StatusCode>,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default initial delay (5 seconds).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(5);

    /// Default maximum delay (60 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Minimum value for `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            retryable_statuses: vec![
                http::StatusCode::TOO_MANY_REQUESTS,
                http::StatusCode::REQUEST_TIMEOUT,
            ],
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the initial delay between retries.
    ///
    /// Zero delay is supported (useful for testing with [`InstantSleeper`])
    /// but not recommended for production as it creates a tight retry loop.
    ///
    /// [`InstantSleeper`]: crate::time::InstantSleeper
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Replaces the list of non-5xx statuses treated as transient.
    #[must_use]
    pub fn with_retryable_statuses(mut self, statuses: Vec<http::StatusCode>) -> Self {
        self.retryable_statuses = statuses;
        self
    }

    /// Computes the delay for a given retry number (0-indexed).
    ///
    /// Returns the delay before retry number `retry`, capped at
    /// `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        // Safe cast: retry values are small (typically < 20) and i32::MAX is ~2 billion
        #[allow(clippy::cast_possible_wrap)]
        let multiplier = self.multiplier.powi(retry as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Returns true if attempt number `attempt` (1-indexed) may be followed
    /// by another.
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Returns true if a response with this status is worth another attempt.
    #[must_use]
    pub fn is_retryable_status(&self, status: http::StatusCode) -> bool {
        status.is_server_error() || self.retryable_statuses.contains(&status)
    }

    /// Returns true if the error represents a transient failure under this
    /// policy.
    #[must_use]
    pub fn is_retryable(&self, error: &RequestError) -> bool {
        match error {
            RequestError::Transport(e) => e.is_retryable(),
            RequestError::Status { status, .. } => self.is_retryable_status(*status),
            RequestError::NoTransport => false,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for checking if an error is retryable.
///
/// Covers the transport-level classification that does not depend on policy
/// configuration; status-based decisions live on [`RetryPolicy`].
pub trait IsRetryable {
    /// Returns true if the error is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for TransportError {
    fn is_retryable(&self) -> bool {
        match self {
            // Network errors are typically transient
            Self::Connection(_) | Self::Timeout => true,
            // Configuration and local I/O problems will not improve on retry
            Self::InvalidUrl(_) | Self::FileRead { .. } | Self::InvalidMime(_) => false,
        }
    }
}

/// Chain handler that retries transient failures with exponential backoff.
///
/// Wraps the rest of the chain: transport-level failures and transient
/// statuses (per the policy) are retried up to `max_attempts`; any other
/// failure is returned immediately. After exhausting attempts the last
/// observed error surfaces unchanged so callers can inspect the real
/// failure.
///
/// Retries are applied uniformly to all methods. Replaying a request is
/// byte-identical, but whether a repeated POST causes duplicate side
/// effects depends on the remote API being idempotent on identical
/// payloads; the client does not enforce this.
///
/// # Type Parameters
///
/// - `S`: The sleeper implementation for backoff delays (defaults to
///   [`TokioSleeper`])
#[derive(Debug)]
pub struct RetryHandler<S = TokioSleeper> {
    policy: RetryPolicy,
    sleeper: S,
}

impl RetryHandler<TokioSleeper> {
    /// Creates a retry handler with the default policy and [`TokioSleeper`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            sleeper: TokioSleeper,
        }
    }

    /// Creates a retry handler with the given policy.
    #[must_use]
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: TokioSleeper,
        }
    }
}

impl<S> RetryHandler<S> {
    /// Replaces the sleeper used for backoff delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> RetryHandler<S2> {
        RetryHandler {
            policy: self.policy,
            sleeper,
        }
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl Default for RetryHandler<TokioSleeper> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sleeper> RetryHandler<S> {
    async fn run_with_retry<'a, T, F>(
        &'a self,
        attempt_fn: F,
    ) -> Result<T, RequestError>
    where
        F: Fn() -> HandlerFuture<'a, T>,
    {
        let mut last_error: Option<RequestError> = None;

        for attempt in 1..=self.policy.max_attempts {
            match attempt_fn().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !self.policy.is_retryable(&e) {
                        return Err(e);
                    }

                    if self.policy.should_retry(attempt) {
                        let delay = self.policy.delay_for_retry(attempt - 1);
                        tracing::debug!(
                            attempt,
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            error = %e,
                            "Transient failure, retrying after backoff"
                        );
                        last_error = Some(e);
                        self.sleeper.sleep(delay).await;
                    } else {
                        last_error = Some(e);
                    }
                }
            }
        }

        tracing::warn!(
            attempts = self.policy.max_attempts,
            "Giving up after exhausting retry attempts"
        );
        Err(last_error.expect("max_attempts >= 1 ensures at least one attempt"))
    }
}

impl<S: Sleeper> Handler for RetryHandler<S> {
    fn handle<'a>(&'a self, request: &'a Request, next: Next<'a>) -> HandlerFuture<'a, Response> {
        Box::pin(self.run_with_retry(move || next.run(request)))
    }

    fn stream<'a>(
        &'a self,
        request: &'a Request,
        next: Next<'a>,
    ) -> HandlerFuture<'a, ResponseStream> {
        // Retries cover establishing the stream; failures after the first
        // chunk cannot be spliced and are left to the consumer.
        Box::pin(self.run_with_retry(move || next.run_stream(request)))
    }
}
