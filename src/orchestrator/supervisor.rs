//! Supervised restart of speech capture
//!
//! Recognition ends on its own regularly (silence, browser limits, device
//! hiccups) and is restarted while the call is active. A run that ends
//! quickly without hearing anything counts as a failure; too many in a row
//! and we stop trying instead of spinning.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    /// Give up once this many runs in a row have failed
    pub max_consecutive_failures: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Runs at least this long count as healthy even if silent
    pub healthy_run: Duration,
}

impl Default for RestartPolicy {
    fn default() -> Self {
        Self {
            max_consecutive_failures: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            healthy_run: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    Restart { delay: Duration },
    GiveUp,
}

#[derive(Debug, Clone)]
pub struct CaptureSupervisor {
    policy: RestartPolicy,
    consecutive_failures: u32,
}

impl CaptureSupervisor {
    #[must_use]
    pub fn new(policy: RestartPolicy) -> Self {
        Self {
            policy,
            consecutive_failures: 0,
        }
    }

    #[must_use]
    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn reset(&mut self) {
        self.consecutive_failures = 0;
    }

    /// Decide what to do after a capture run ended
    pub fn on_ended(&mut self, ran_for: Duration, heard_speech: bool) -> RestartDecision {
        if heard_speech || ran_for >= self.policy.healthy_run {
            self.consecutive_failures = 0;
            return RestartDecision::Restart {
                delay: Duration::ZERO,
            };
        }
        self.on_failure()
    }

    /// A run that never got going (start failed or ended immediately)
    pub fn on_failure(&mut self) -> RestartDecision {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.policy.max_consecutive_failures {
            return RestartDecision::GiveUp;
        }
        RestartDecision::Restart {
            delay: self.backoff(self.consecutive_failures),
        }
    }

    /// Exponential backoff: base, 2x base, 4x base, ... capped at `max_delay`
    fn backoff(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(16);
        self.policy
            .base_delay
            .saturating_mul(1 << exponent)
            .min(self.policy.max_delay)
    }
}

impl Default for CaptureSupervisor {
    fn default() -> Self {
        Self::new(RestartPolicy::default())
    }
}
