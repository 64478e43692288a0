//! Clock adapters.

use crate::ports::outbound::Clock;
use orb_types::Timestamp;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

/// Clock that only moves when told to. For tests and script replay.
#[derive(Debug, Default)]
pub struct FixedClock {
    now: AtomicU64,
}

impl FixedClock {
    /// Create a clock stopped at `now`.
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Jump to `now`.
    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move forward by `seconds`.
    pub fn advance(&self, seconds: u64) {
        self.now.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_fixed_clock_moves_on_request() {
        let clock = FixedClock::new(100);
        assert_eq!(clock.now(), 100);

        clock.advance(5);
        assert_eq!(clock.now(), 105);

        clock.set(7);
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn test_shared_clock() {
        let clock = Arc::new(FixedClock::new(1));
        let handle = clock.clone();
        handle.advance(1);
        assert_eq!(clock.now(), 2);
    }

    #[test]
    fn test_system_clock_after_2023() {
        assert!(SystemClock.now() > 1_672_531_200);
    }
}
