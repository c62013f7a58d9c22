//! Waiting for the daemon to reach a state after a launch or a signal.

use std::time::Duration;

use isagent_config::SettlePolicy;
use tracing::debug;

use super::LIFECYCLE_TARGET;
use super::environment::ProcessEnvironment;

/// Pauses and re-probes until `reached` holds or the policy's budget is
/// spent.
///
/// Every probe is preceded by a pause, so a freshly signalled or launched
/// daemon always gets at least one interval to settle. Returns whether the
/// state was reached.
pub(super) fn settle<E, F>(environment: &E, policy: SettlePolicy, mut reached: F) -> bool
where
    E: ProcessEnvironment + ?Sized,
    F: FnMut() -> bool,
{
    let mut waited = Duration::ZERO;
    let mut interval = policy.initial_interval();
    let mut probes = 0_u32;
    loop {
        let step = interval.min(policy.timeout().saturating_sub(waited));
        environment.pause(step);
        waited = waited.saturating_add(step);
        probes = probes.saturating_add(1);
        if reached() {
            debug!(
                target: LIFECYCLE_TARGET,
                probes,
                waited_ms = waited.as_millis(),
                "daemon settled"
            );
            return true;
        }
        if waited >= policy.timeout() {
            debug!(
                target: LIFECYCLE_TARGET,
                probes,
                waited_ms = waited.as_millis(),
                "settle budget exhausted"
            );
            return false;
        }
        interval = interval.saturating_mul(policy.backoff());
    }
}
