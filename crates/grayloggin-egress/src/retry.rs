//! Retrying POST with additive jittered backoff
//!
//! The search endpoint is flaky under load, so every POST is retried on any
//! transport error or non-2xx status. After each failed attempt the caller
//! sleeps, and the sleep grows by a random multiple of a fixed step:
//!
//! ```text
//! attempt 1 fails -> sleep 1s
//! attempt 2 fails -> sleep 1s + k1 * 250ms
//! attempt 3 fails -> sleep 1s + (k1 + k2) * 250ms
//! ```
//!
//! with every `k` drawn uniformly from `0..120`. With the default policy the
//! first attempt is followed by up to 10 retries (11 attempts in total).

use crate::{EgressError, HttpRequest, HttpResponse, Result, Transport};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Retry budget and backoff shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt
    pub max_retries: u32,

    /// Sleep after the first failure
    pub initial_sleep: Duration,

    /// Size of one jitter step
    pub jitter_step: Duration,

    /// Number of discrete jitter steps; increments are drawn from `0..jitter_steps`
    pub jitter_steps: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 10,
            initial_sleep: Duration::from_secs(1),
            jitter_step: Duration::from_millis(250),
            jitter_steps: 120,
        }
    }
}

impl RetryPolicy {
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Blocks the calling thread between attempts
pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Shared flag that stops a search between attempts and between pages
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Sends requests through a [`Transport`] under a [`RetryPolicy`]
pub struct Retrier {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    rng: Box<dyn RngCore + Send>,
    cancel: Option<CancelHandle>,
}

impl Retrier {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(ThreadSleeper),
            rng: Box::new(StdRng::from_os_rng()),
            cancel: None,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the randomness source used for jitter
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelHandle) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn jitter(&mut self) -> Duration {
        if self.policy.jitter_steps == 0 {
            return Duration::ZERO;
        }
        let steps = self.rng.random_range(0..self.policy.jitter_steps);
        self.policy.jitter_step * steps
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled)
    }

    /// Send `request` until it returns 2xx or the retry budget is spent.
    pub fn send(&mut self, transport: &dyn Transport, request: &HttpRequest) -> Result<HttpResponse> {
        let mut retries_remaining = self.policy.max_retries;
        let mut sleep = self.policy.initial_sleep;
        let mut attempts = 1;

        loop {
            match transport.execute(request) {
                Ok(response) if response.is_success() => {
                    debug!(uri = %request.uri, attempts, "Request succeeded");
                    return Ok(response);
                }
                Ok(response) => warn!(
                    uri = %request.uri,
                    status = response.status,
                    retries_remaining,
                    "Request returned non-success status"
                ),
                Err(e) => warn!(
                    uri = %request.uri,
                    error = %e,
                    retries_remaining,
                    "Request failed"
                ),
            }

            if retries_remaining == 0 {
                break;
            }
            if self.is_cancelled() {
                return Err(EgressError::Cancelled);
            }

            debug!(
                "Retrying after {:?} (attempt {}/{})",
                sleep,
                attempts + 1,
                self.policy.max_attempts()
            );
            self.sleeper.sleep(sleep);
            sleep += self.jitter();
            retries_remaining -= 1;
            attempts += 1;

            if self.is_cancelled() {
                return Err(EgressError::Cancelled);
            }
        }

        Err(EgressError::RetryBudgetExhausted {
            uri: request.uri.clone(),
            attempts,
            retries_remaining,
            sleep,
        })
    }
}
