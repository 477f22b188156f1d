//! Fixed-step tick scheduling.
//!
//! The simulation advances in whole ~16.6 ms steps no matter how often
//! the host repaints. The clock accumulates real elapsed time and hands
//! the caller the number of steps to run, which keeps the physics
//! deterministic and lets tests drive it with synthetic instants instead
//! of a real timer.

use std::time::{Duration, Instant};

/// Simulation rate in steps per second.
pub const TICK_RATE: u32 = 60;
/// Duration of one simulation step.
pub const TICK_INTERVAL: Duration = Duration::from_micros(1_000_000 / TICK_RATE as u64);
/// Most steps handed out for a single frame. After a long stall (hidden
/// window, suspended process) the backlog is dropped instead of replayed.
const MAX_STEPS_PER_FRAME: u32 = 5;

pub struct TickClock {
    last: Option<Instant>,
    accumulator: Duration,
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock {
    pub fn new() -> Self {
        Self {
            last: None,
            accumulator: Duration::ZERO,
        }
    }

    /// Number of whole steps elapsed since the previous call. The very
    /// first call returns a single step so the world starts moving.
    pub fn steps(&mut self, now: Instant) -> u32 {
        let last = match self.last {
            Some(last) => last,
            None => {
                self.last = Some(now);
                return 1;
            }
        };
        self.accumulator += now.saturating_duration_since(last);
        self.last = Some(now);

        let mut steps = 0;
        while self.accumulator >= TICK_INTERVAL && steps < MAX_STEPS_PER_FRAME {
            self.accumulator -= TICK_INTERVAL;
            steps += 1;
        }
        if steps == MAX_STEPS_PER_FRAME {
            self.accumulator = Duration::ZERO;
        }
        steps
    }
}
