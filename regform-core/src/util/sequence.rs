//! Monotonic request tokens.
//!
//! Every async operation whose result lands in visible state takes a token
//! when it starts. On completion the result is applied only if its token is
//! still the latest one issued.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub const fn new() -> Self {
        Self {
            latest: AtomicU64::new(0),
        }
    }

    /// Issues a token that supersedes every earlier one.
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Supersedes all outstanding tokens without starting a new operation.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::AcqRel);
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::Acquire) == token.0
    }

    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_token_is_current() {
        let seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();

        assert!(a < b);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[test]
    fn test_invalidate_supersedes_outstanding_token() {
        let seq = RequestSequencer::new();
        let a = seq.issue();
        seq.invalidate();
        assert!(!seq.is_current(a));
        assert_eq!(seq.latest(), 2);
    }
}
