//! Timing policy for waiting on the daemon after a launch or a signal.
//!
//! A policy describes a poll-with-backoff loop bounded by a deadline. With the
//! default values the loop degenerates to one fixed pause followed by a single
//! probe.

use std::time::Duration;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Bounds for one settle wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    timeout: Duration,
    initial_interval: Duration,
    backoff: u32,
}

impl SettlePolicy {
    /// Builds a policy, clamping the interval into `1ms..=timeout` and the
    /// backoff to at least one.
    ///
    /// A zero timeout yields a policy that probes once without pausing.
    pub fn new(timeout: Duration, initial_interval: Duration, backoff: u32) -> Self {
        let initial_interval = if timeout.is_zero() {
            Duration::ZERO
        } else {
            initial_interval.clamp(MIN_INTERVAL, timeout)
        };
        Self {
            timeout,
            initial_interval,
            backoff: backoff.max(1),
        }
    }

    /// Total pause budget for one wait.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pause before the first probe.
    pub const fn initial_interval(&self) -> Duration {
        self.initial_interval
    }

    /// Growth factor applied to the pause after each unsuccessful probe.
    pub const fn backoff(&self) -> u32 {
        self.backoff
    }
}
