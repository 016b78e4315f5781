#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-move countdown used by the Number Rush world.
//!
//! The countdown is driven externally: adapters feed one [`Timer::tick`] per
//! elapsed second. Starting always stops the previous countdown first, so a
//! timer can never have two tickers feeding it, and expiry is reported by
//! exactly one tick.

use thiserror::Error;

/// Lifecycle of the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// Not counting; ticks are ignored.
    Stopped,
    /// Counting down; every tick removes a second.
    Running,
    /// Reached zero; ticks are ignored until the timer is started again.
    Expired,
}

/// Result of feeding a single tick to the countdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// The countdown was not running, so nothing happened.
    Idle,
    /// A second elapsed and the countdown is still running.
    Counting {
        /// Seconds left after the tick.
        remaining: u32,
    },
    /// The countdown reached zero on this tick.
    Expired,
}

/// Reasons an extension request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ExtendRejected {
    /// Only a running countdown can be extended.
    #[error("the countdown is not running (state {state:?})")]
    NotRunning {
        /// State the countdown was in.
        state: TimerState,
    },
}

/// Countdown measured in whole seconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timer {
    limit: u32,
    remaining: u32,
    state: TimerState,
}

impl Timer {
    /// Creates a stopped countdown holding a full `limit` allowance.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            remaining: limit,
            state: TimerState::Stopped,
        }
    }

    /// Starts counting from a full allowance, discarding any previous countdown.
    pub fn start(&mut self) {
        self.stop();
        self.remaining = self.limit;
        self.state = TimerState::Running;
    }

    /// Refills a running countdown. Returns `false` when the timer is not running.
    pub fn reset(&mut self) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.remaining = self.limit;
        true
    }

    /// Adds `seconds` to a running countdown and returns the new remaining time.
    pub fn extend(&mut self, seconds: u32) -> Result<u32, ExtendRejected> {
        if self.state != TimerState::Running {
            return Err(ExtendRejected::NotRunning { state: self.state });
        }
        self.remaining = self.remaining.saturating_add(seconds);
        Ok(self.remaining)
    }

    /// Removes one second from a running countdown.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Idle;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.state = TimerState::Expired;
            return TickOutcome::Expired;
        }
        TickOutcome::Counting {
            remaining: self.remaining,
        }
    }

    /// Halts the countdown, keeping the remaining time.
    pub fn stop(&mut self) {
        self.state = TimerState::Stopped;
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    /// Reports whether the countdown is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_timer_is_stopped_with_full_allowance() {
        let timer = Timer::new(30);
        assert_eq!(timer.state(), TimerState::Stopped);
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn stopped_timer_ignores_ticks() {
        let mut timer = Timer::new(3);
        assert_eq!(timer.tick(), TickOutcome::Idle);
        assert_eq!(timer.remaining(), 3);
    }

    #[test]
    fn running_timer_counts_down() {
        let mut timer = Timer::new(3);
        timer.start();
        assert_eq!(timer.tick(), TickOutcome::Counting { remaining: 2 });
        assert_eq!(timer.tick(), TickOutcome::Counting { remaining: 1 });
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let mut timer = Timer::new(2);
        timer.start();
        let outcomes: Vec<_> = (0..5).map(|_| timer.tick()).collect();
        let expirations = outcomes
            .iter()
            .filter(|outcome| **outcome == TickOutcome::Expired)
            .count();
        assert_eq!(expirations, 1);
        assert_eq!(timer.state(), TimerState::Expired);
        assert_eq!(outcomes[2..], [TickOutcome::Idle, TickOutcome::Idle, TickOutcome::Idle]);
    }

    #[test]
    fn reset_refills_running_timer_only() {
        let mut timer = Timer::new(5);
        assert!(!timer.reset());

        timer.start();
        let _ = timer.tick();
        let _ = timer.tick();
        assert!(timer.reset());
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn extension_does_not_raise_the_refill() {
        let mut timer = Timer::new(5);
        timer.start();
        assert_eq!(timer.extend(10), Ok(15));
        assert!(timer.reset());
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn start_discards_previous_countdown() {
        let mut timer = Timer::new(4);
        timer.start();
        let _ = timer.tick();
        timer.start();
        assert_eq!(timer.remaining(), 4);
        assert!(timer.is_running());
    }

    #[test]
    fn start_recovers_from_expiry() {
        let mut timer = Timer::new(1);
        timer.start();
        assert_eq!(timer.tick(), TickOutcome::Expired);
        timer.start();
        assert_eq!(timer.state(), TimerState::Running);
        assert_eq!(timer.remaining(), 1);
    }

    #[test]
    fn extend_adds_seconds_while_running() {
        let mut timer = Timer::new(30);
        timer.start();
        assert_eq!(timer.extend(10), Ok(40));
    }

    #[test]
    fn extend_is_rejected_when_not_running() {
        let mut timer = Timer::new(30);
        assert_eq!(
            timer.extend(10),
            Err(ExtendRejected::NotRunning {
                state: TimerState::Stopped
            })
        );
        assert_eq!(timer.remaining(), 30);
    }

    #[test]
    fn stop_keeps_remaining_time() {
        let mut timer = Timer::new(9);
        timer.start();
        let _ = timer.tick();
        timer.stop();
        assert_eq!(timer.remaining(), 8);
        assert_eq!(timer.tick(), TickOutcome::Idle);
    }
}
