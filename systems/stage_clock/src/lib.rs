#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-stage countdown clock.

use std::time::Duration;

/// Outcome of advancing the clock by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockStatus {
    /// The clock is not running; nothing changed.
    Idle,
    /// Time is left on the clock.
    Running {
        /// Time left after the tick.
        remaining: Duration,
    },
    /// The clock reached zero on this tick and stopped itself.
    Expired,
}

/// Countdown that runs from a stage time limit down to zero.
///
/// Expiry is reported exactly once; the clock stops itself afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StageClock {
    remaining: Duration,
    active: bool,
}

impl StageClock {
    /// Creates a stopped clock with no time on it.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            remaining: Duration::ZERO,
            active: false,
        }
    }

    /// Resets the clock to `limit` and starts it.
    pub fn start(&mut self, limit: Duration) {
        self.remaining = limit;
        self.active = true;
    }

    /// Stops the clock without reporting expiry.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// Reports whether ticks currently consume time.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Time left on the clock.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Consumes `dt` from the clock.
    pub fn advance(&mut self, dt: Duration) -> ClockStatus {
        if !self.active {
            return ClockStatus::Idle;
        }

        self.remaining = self.remaining.saturating_sub(dt);
        if self.remaining.is_zero() {
            self.active = false;
            return ClockStatus::Expired;
        }

        ClockStatus::Running {
            remaining: self.remaining,
        }
    }
}

/// Whole seconds shown to the player, rounding partial seconds up.
#[must_use]
pub fn display_seconds(remaining: Duration) -> u64 {
    let whole = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        whole + 1
    } else {
        whole
    }
}
