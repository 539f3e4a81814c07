// Countdown timer driven by discrete ticks.

use std::time::Duration;

/// Default tick period for round countdowns.
pub const DEFAULT_TICK: Duration = Duration::from_millis(1000);

/// Result of one tick on a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub remaining_ms: u64,
    // Set exactly once, on the tick that reaches zero.
    pub expired: bool,
}

/// Counts a duration down in fixed steps.
///
/// The timer does not own a clock; whoever holds it calls `tick` once per
/// period. Remaining time is strictly decreasing across ticks and always ends
/// on exactly 0, after which the timer is stopped.
#[derive(Debug, Clone)]
pub struct CountdownTimer {
    tick_ms: u64,
    remaining_ms: u64,
    running: bool,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

impl CountdownTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            // A zero period would never reach zero.
            tick_ms: (period.as_millis() as u64).max(1),
            remaining_ms: 0,
            running: false,
        }
    }

    /// Arms the timer, replacing any countdown in progress.
    pub fn start(&mut self, duration_ms: u64) {
        self.remaining_ms = duration_ms;
        self.running = true;
    }

    /// Advances one period. Returns `None` when the timer is not running.
    pub fn tick(&mut self) -> Option<Tick> {
        if !self.running {
            return None;
        }

        self.remaining_ms = self.remaining_ms.saturating_sub(self.tick_ms);
        let expired = self.remaining_ms == 0;
        if expired {
            self.running = false;
        }

        Some(Tick {
            remaining_ms: self.remaining_ms,
            expired,
        })
    }

    /// Stops the timer. Safe to call at any time, any number of times.
    pub fn cancel(&mut self) -> bool {
        std::mem::replace(&mut self.running, false)
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
