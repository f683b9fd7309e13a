// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Bounded cooperative waiting
//!
//! Every accessor that needs something to exist (an alias exchange, an
//! element) goes through [`BoundedWait::resolve`]. The check is re-run each
//! time the optional change signal fires or the poll interval elapses,
//! whichever comes first, until it yields a value or the deadline passes.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::Result;

/// Default wait before an accessor gives up
pub const DEFAULT_TIMEOUT_MS: u64 = 4000;

/// Default interval between checks when no change signal fires
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 25;

/// Outcome of a bounded wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Resolved(T),
    TimedOut { waited: Duration },
}

impl<T> Resolution<T> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// Resolved value, or the error built from the time waited
    pub fn or_else_err<F>(self, err: F) -> Result<T>
    where
        F: FnOnce(u64) -> crate::error::Error,
    {
        match self {
            Resolution::Resolved(value) => Ok(value),
            Resolution::TimedOut { waited } => Err(err(waited.as_millis() as u64)),
        }
    }
}

/// Deadline plus poll interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedWait {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for BoundedWait {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl BoundedWait {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    /// Run `check` until it yields a value or the deadline passes.
    ///
    /// `subject` only labels log lines. Errors from `check` abort the wait
    /// immediately. The check always runs at least once, even with a zero
    /// timeout.
    pub async fn resolve<T, F>(
        &self,
        subject: &str,
        mut signal: Option<watch::Receiver<u64>>,
        mut check: F,
    ) -> Result<Resolution<T>>
    where
        F: FnMut() -> Result<Option<T>>,
    {
        let start = Instant::now();
        let deadline = start + self.timeout;
        let mut attempts = 0u32;

        loop {
            if let Some(rx) = signal.as_mut() {
                rx.borrow_and_update();
            }

            attempts += 1;
            if let Some(value) = check()? {
                debug!(subject, attempts, "wait resolved");
                return Ok(Resolution::Resolved(value));
            }

            let now = Instant::now();
            if now >= deadline {
                let waited = now - start;
                warn!(subject, attempts, waited_ms = waited.as_millis() as u64, "wait timed out");
                return Ok(Resolution::TimedOut { waited });
            }

            let nap = self.poll_interval.min(deadline - now);
            let sender_gone = match signal.as_mut() {
                Some(rx) => tokio::select! {
                    changed = rx.changed() => changed.is_err(),
                    _ = sleep(nap) => false,
                },
                None => {
                    sleep(nap).await;
                    false
                }
            };
            if sender_gone {
                signal = None;
            }
        }
    }
}
