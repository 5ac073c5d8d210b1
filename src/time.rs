//! Time abstractions for testability.
//!
//! This module provides a [`Clock`] trait for reading the current time and a
//! [`Sleeper`] trait for suspending between retries and polls, allowing tests
//! to inject controlled time instead of relying on the system clock or real
//! delays.

use std::time::{Duration, SystemTime};

/// Abstraction over system time.
///
/// The webhook verifier uses this to check timestamp tolerance windows;
/// tests inject mock clocks to exercise stale and future timestamps.
///
/// # Example
///
/// ```
/// use salad_transcribe::time::{Clock, SystemClock};
///
/// let clock = SystemClock;
/// let now = clock.now();
/// assert!(now >= std::time::SystemTime::UNIX_EPOCH);
/// ```
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> SystemTime;
}

/// Production clock using actual system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Abstraction over delay for retry backoff and poll intervals.
///
/// Implementations must suspend the calling task without blocking the
/// runtime's worker threads.
pub trait Sleeper: Send + Sync {
    /// Suspends the current task for the given duration.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}

/// Production sleeper using [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Sleeper that returns immediately, for tests that exercise retry and
/// polling loops without real delays.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantSleeper;

impl Sleeper for InstantSleeper {
    async fn sleep(&self, _duration: Duration) {}
}
