//! Bookkeeping for notification expiry timeouts.

use std::cell::Cell;

use chrono::{DateTime, Utc};

/// Tracks the deadline a timeout is armed for, so repeated publishes of
/// the same notification arm a single timer.
#[derive(Debug, Default)]
pub struct ExpiryGate {
    pending: Cell<Option<DateTime<Utc>>>,
}

impl ExpiryGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `deadline` as armed. Returns false when a timeout for it is
    /// already pending and no new one should be scheduled.
    pub fn arm(&self, deadline: DateTime<Utc>) -> bool {
        if self.pending.get() == Some(deadline) {
            return false;
        }
        self.pending.set(Some(deadline));
        true
    }

    /// The timeout for `deadline` fired or could not be scheduled.
    pub fn release(&self, deadline: DateTime<Utc>) {
        if self.pending.get() == Some(deadline) {
            self.pending.set(None);
        }
    }

    pub fn pending(&self) -> Option<DateTime<Utc>> {
        self.pending.get()
    }
}
