use std::time::Duration;

use glam::DVec2;

use crate::util::ring::RingBuffer;

/// Body name for logs and snapshots ("cat", "earth").
#[derive(Debug, Clone)]
pub struct Label(pub String);

/// Repeating timer driving one body.
///
/// `next_due` is measured on the session clock and only means anything while
/// the session is running.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    pub period: Duration,
    pub next_due: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: Duration::ZERO,
        }
    }

    /// Arm the timer so its first tick lands one period after `now`.
    pub fn arm(&mut self, now: Duration) {
        self.next_due = now.checked_add(self.period).unwrap_or(Duration::MAX);
    }

    /// Schedule the tick after the one that just fired.
    pub fn rearm(&mut self) {
        self.next_due = self.next_due.checked_add(self.period).unwrap_or(Duration::MAX);
    }
}

/// Marks a body whose numbers are pushed to the state callback each refresh.
#[derive(Debug, Clone, Copy)]
pub struct Tracked;

/// Trail length used when trails are switched on without a size.
pub const DEFAULT_TRAIL_LEN: usize = 64;

/// Recent positions, sampled once per tick.
#[derive(Debug, Clone)]
pub struct Trail(pub RingBuffer<DVec2>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_arming() {
        let mut ticker = Ticker::new(Duration::from_millis(10));
        ticker.arm(Duration::from_millis(95));
        assert_eq!(ticker.next_due, Duration::from_millis(105));
        ticker.rearm();
        ticker.rearm();
        assert_eq!(ticker.next_due, Duration::from_millis(125));
    }

    #[test]
    fn ticker_saturates_instead_of_overflowing() {
        let mut ticker = Ticker::new(Duration::MAX);
        ticker.arm(Duration::from_secs(1));
        assert_eq!(ticker.next_due, Duration::MAX);
        ticker.rearm();
        assert_eq!(ticker.next_due, Duration::MAX);
    }
}
