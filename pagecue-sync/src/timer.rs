//! Cancellable debounce timer and bounded retry budget.

use std::time::Duration;
use tokio::time::{self, Instant};

/// A single-shot quiet-period timer.
///
/// Scheduling while a deadline is pending pushes it back, so a burst of
/// events collapses into one expiry. Only one deadline exists at a time.
#[derive(Debug, Default)]
pub struct Debounce {
    deadline: Option<Instant>,
}

impl Debounce {
    /// Creates a timer with nothing scheduled.
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)starts the timer `quiet` from now.
    pub fn schedule(&mut self, quiet: Duration) {
        self.deadline = Some(Instant::now() + quiet);
    }

    /// Clears any pending deadline. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Whether a deadline is scheduled.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// The pending deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Completes when the pending deadline passes; never completes while
    /// nothing is scheduled. Does not clear the deadline.
    pub async fn elapsed(&self) {
        match self.deadline {
            Some(deadline) => time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

/// A capped attempt counter for polling loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    attempts: u32,
    max: u32,
}

impl RetryBudget {
    /// A budget allowing `max` attempts.
    pub fn new(max: u32) -> Self {
        Self { attempts: 0, max }
    }

    /// Uses one attempt. Returns false, without counting, once exhausted.
    pub fn try_consume(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.attempts += 1;
        true
    }

    /// Whether every attempt has been used.
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max
    }

    /// Attempts used so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// The cap.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Attempts left before the cap.
    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.attempts)
    }
}
