//! Gravity scheduler: decides when the app should call `drop_piece`.

use std::time::{Duration, Instant};

/// Gravity interval at level 0 (0.6 s).
const BASE_INTERVAL_MS: u64 = 600;
/// Speed-up per level (0.08 s).
const LEVEL_STEP_MS: u64 = 80;
/// Fastest gravity (0.08 s).
const MIN_INTERVAL_MS: u64 = 80;

/// Time between gravity ticks at `level`: max(0.6 - level * 0.08, 0.08) seconds.
/// Kept in whole milliseconds so the steps are exact.
pub fn gravity_interval(level: u32) -> Duration {
    let ms = BASE_INTERVAL_MS
        .saturating_sub(u64::from(level) * LEVEL_STEP_MS)
        .max(MIN_INTERVAL_MS);
    Duration::from_millis(ms)
}

/// Fires once per gravity interval. Owns only the last-fire instant; the
/// level is passed in on every poll so a level change applies immediately.
#[derive(Debug, Clone, Copy)]
pub struct Ticker {
    last: Instant,
}

impl Ticker {
    pub fn new(now: Instant) -> Self {
        Self { last: now }
    }

    /// True (and restarts the interval) when a tick is due.
    pub fn poll(&mut self, now: Instant, level: u32) -> bool {
        if now.saturating_duration_since(self.last) >= gravity_interval(level) {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Restart the interval, e.g. after a pause.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Time left until the next tick at `level`.
    pub fn remaining(&self, now: Instant, level: u32) -> Duration {
        gravity_interval(level).saturating_sub(now.saturating_duration_since(self.last))
    }
}
