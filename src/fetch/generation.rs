//! Request generations for in-flight loads
//!
//! Every load is tagged with a token from a [`RequestTracker`]. When a newer load
//! is issued before an older one finishes, the older result is discarded instead
//! of overwriting the newer state.

use tracing::debug;

/// Identifies one issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tokens and tracks the latest one
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new token, superseding all earlier ones
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Whether `token` is the most recently issued one
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }

    /// Stores `value` into `slot` only if `token` is current
    ///
    /// Returns `true` when the value was committed.
    pub fn commit<T>(&self, token: RequestToken, slot: &mut T, value: T) -> bool {
        if self.is_current(token) {
            *slot = value;
            true
        } else {
            debug!(
                token = token.0,
                latest = self.latest,
                "Discarding stale result"
            );
            false
        }
    }
}
