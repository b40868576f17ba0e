//! Bounded fixed-interval retry used by the readiness stage.
//!
//! The clock is injected through [`Sleeper`] so tests can simulate a full
//! timeout without real delays.

use std::time::Duration;

/// Sleep seam between the poller and the real clock.
pub trait Sleeper {
    fn sleep(&mut self, interval: Duration);
}

/// Real clock: blocks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, interval: Duration) {
        std::thread::sleep(interval);
    }
}

/// Retry budget for one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

/// What happened after polling one service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
    pub ready: bool,
    /// Number of probe attempts actually performed.
    pub attempts: u32,
}

/// Probe until ready or the attempt budget is exhausted.
///
/// The probe is attempted up to `policy.attempts` times with one sleep of
/// `policy.interval` between consecutive attempts (no trailing sleep). Probe
/// errors must be mapped to `false` by the caller; exhaustion is reported as a
/// normal outcome, never an error.
pub fn poll_until_ready<P>(
    policy: PollPolicy,
    sleeper: &mut dyn Sleeper,
    mut probe: P,
) -> PollOutcome
where
    P: FnMut(u32) -> bool,
{
    for attempt in 1..=policy.attempts {
        if probe(attempt) {
            return PollOutcome {
                ready: true,
                attempts: attempt,
            };
        }
        if attempt < policy.attempts {
            sleeper.sleep(policy.interval);
        }
    }
    PollOutcome {
        ready: false,
        attempts: policy.attempts,
    }
}
