//! Logical time and retransmission timeouts.
//!
//! The simulation never waits on a wall clock to make progress.  Each engine
//! owns a [`LogicalClock`] that advances by one tick per transmission and per
//! idle sender pass; a frame has timed out once
//! `now - last_sent >= timeout_ticks`.
//!
//! Real-time pacing is optional and purely cosmetic: when
//! [`TimerConfig::pacing`] is non-zero the clock also sleeps that long per
//! transmission so a human can follow the log.

use std::time::Duration;

/// Timeout and pacing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// Ticks an unacknowledged frame may stay outstanding before it is resent.
    pub timeout_ticks: u64,
    /// Wall-clock delay per transmission (`Duration::ZERO` = none).
    pub pacing: Duration,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            timeout_ticks: 10,
            pacing: Duration::ZERO,
        }
    }
}

/// Monotonic tick counter shared by one sender/receiver pair.
#[derive(Debug, Clone, Default)]
pub struct LogicalClock {
    now: u64,
    pacing: Duration,
}

impl LogicalClock {
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            now: 0,
            pacing: config.pacing,
        }
    }

    /// Current tick.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Advance by `ticks` without pacing.
    pub fn advance(&mut self, ticks: u64) {
        self.now = self.now.saturating_add(ticks);
    }

    /// Advance by one tick for a transmission, sleeping if pacing is enabled.
    pub fn on_transmit(&mut self) -> u64 {
        if !self.pacing.is_zero() {
            std::thread::sleep(self.pacing);
        }
        self.advance(1);
        self.now
    }

    /// `true` when a frame last sent at `sent_at` has exceeded `timeout`.
    pub fn expired(&self, sent_at: u64, timeout: u64) -> bool {
        self.now.saturating_sub(sent_at) >= timeout
    }
}
