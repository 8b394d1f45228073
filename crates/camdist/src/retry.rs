//! Fixed-interval polling until an external condition holds.

use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::error::Result;

/// How many times a condition is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempts {
    Bounded(u32),
    Unbounded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: Attempts,
}

impl PollPolicy {
    /// Check every `interval` until the condition holds.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            attempts: Attempts::Unbounded,
        }
    }

    /// Check at most `max_attempts` times, `interval` apart.
    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            attempts: Attempts::Bounded(max_attempts),
        }
    }

    fn allows(&self, attempt: u32) -> bool {
        match self.attempts {
            Attempts::Bounded(max) => attempt <= max,
            Attempts::Unbounded => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    Ready(T),
    Exhausted { attempts: u32 },
    Cancelled,
}

/// Run `check` until it yields a value.
///
/// `check` receives the 1-based attempt number. Between attempts `wait` is
/// called with the interval and returns `true` to cancel. Errors from
/// `check` end the poll immediately.
pub fn poll<T, C, W>(policy: &PollPolicy, mut check: C, mut wait: W) -> Result<PollOutcome<T>>
where
    C: FnMut(u32) -> Result<Option<T>>,
    W: FnMut(Duration) -> bool,
{
    let mut attempt = 1u32;
    loop {
        if !policy.allows(attempt) {
            return Ok(PollOutcome::Exhausted {
                attempts: attempt - 1,
            });
        }

        if let Some(value) = check(attempt)? {
            debug!("Condition met after {} attempt(s)", attempt);
            return Ok(PollOutcome::Ready(value));
        }

        if policy.allows(attempt + 1) && wait(policy.interval) {
            return Ok(PollOutcome::Cancelled);
        }
        attempt = attempt.saturating_add(1);
    }
}

/// [`poll`] with a plain, uninterruptible sleep between attempts.
pub fn poll_sleeping<T, C>(policy: &PollPolicy, check: C) -> Result<PollOutcome<T>>
where
    C: FnMut(u32) -> Result<Option<T>>,
{
    poll(policy, check, |interval| {
        thread::sleep(interval);
        false
    })
}
