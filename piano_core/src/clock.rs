//! Millisecond time sources.
//!
//! The core never reads the wall clock itself; every time-dependent call
//! takes `now_ms`, and the loop driving it picks the source.

use std::cell::Cell;
use std::time::Instant;

pub trait TimeProvider {
    /// Milliseconds since an arbitrary, fixed epoch.
    fn now_ms(&self) -> u64;
}

/// Monotonic clock anchored at construction.
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { start: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self { Self::new() }
}

impl TimeProvider for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for deterministic tests and replays.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock { now: Cell::new(start_ms) }
    }

    pub fn set(&self, ms: u64) { self.now.set(ms); }

    pub fn advance(&self, delta_ms: u64) {
        self.now.set(self.now.get() + delta_ms);
    }
}

impl TimeProvider for ManualClock {
    fn now_ms(&self) -> u64 { self.now.get() }
}
