//! Emit-at-most-once-per-window gate.
//!
//! Rate-limits repeated emissions (typically error logs) on a hot path. The
//! gate is monotonic-time driven and allocation-free, so it is safe to
//! consult from inside the real-time cycle.

use std::time::{Duration, Instant};

/// Rate limiter: `ready` returns true at most once per window.
#[derive(Debug, Clone)]
pub struct Throttle {
    window: Duration,
    last_emit: Option<Instant>,
}

impl Throttle {
    /// Create a throttle with the given minimum spacing between emissions.
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            last_emit: None,
        }
    }

    /// Check whether an emission is due at `now`.
    ///
    /// Returns true (and arms the window) on the first call and whenever at
    /// least `window` has elapsed since the last true result.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last_emit {
            Some(last) if now.saturating_duration_since(last) < self.window => false,
            _ => {
                self.last_emit = Some(now);
                true
            }
        }
    }

    /// Forget the last emission; the next `ready` call returns true.
    pub fn reset(&mut self) {
        self.last_emit = None;
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
