//! Decides whether the daemon behind a resolved identity is running.

use std::fmt;

use tracing::warn;

use super::LIFECYCLE_TARGET;
use super::environment::ProcessEnvironment;
use super::error::LifecycleError;
use super::pid_store::{ProcessId, ProcessIdentity};

/// Whether the managed daemon is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    /// A process answers to the recorded id.
    Running,
    /// No identity, or nothing answers to it.
    NotRunning,
}

impl LivenessState {
    /// Convenience predicate for settle loops.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl fmt::Display for LivenessState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => formatter.write_str("running"),
            Self::NotRunning => formatter.write_str("not running"),
        }
    }
}

/// Existence check for a process identity.
///
/// The check only asks whether *some* process holds the id. It does not
/// confirm the process is the image server, so a recycled pid left in a stale
/// pid file reads as running.
pub struct LivenessProbe<'a, E: ?Sized> {
    environment: &'a E,
}

impl<'a, E> LivenessProbe<'a, E>
where
    E: ProcessEnvironment + ?Sized,
{
    /// Creates a probe that asks `environment` about processes.
    pub fn new(environment: &'a E) -> Self {
        Self { environment }
    }

    /// Resolves `identity` to a liveness state.
    ///
    /// An absent identity is never looked up.
    pub fn is_alive(&self, identity: ProcessIdentity) -> LivenessState {
        let Some(pid) = identity else {
            return LivenessState::NotRunning;
        };
        match self.environment.process_exists(pid) {
            Ok(true) => LivenessState::Running,
            Ok(false) => LivenessState::NotRunning,
            Err(error) => fail_closed_to_absent(pid, &error),
        }
    }
}

/// Policy for probes the OS could not answer: report the daemon as not
/// running.
fn fail_closed_to_absent(pid: ProcessId, error: &LifecycleError) -> LivenessState {
    warn!(
        target: LIFECYCLE_TARGET,
        pid = pid.get(),
        error = %error,
        "liveness probe failed; treating daemon as not running"
    );
    LivenessState::NotRunning
}

#[cfg(test)]
mod tests {
    use nix::errno::Errno;
    use rstest::rstest;

    use super::*;
    use crate::tests::support::MockEnvironment;

    fn pid(raw: u32) -> ProcessId {
        ProcessId::new(raw).expect("valid pid")
    }

    #[test]
    fn absent_identity_never_queries_the_os() {
        let environment = MockEnvironment::new();
        let probe = LivenessProbe::new(&environment);
        assert_eq!(probe.is_alive(None), LivenessState::NotRunning);
    }

    #[rstest]
    #[case::present(true, LivenessState::Running)]
    #[case::missing(false, LivenessState::NotRunning)]
    fn follows_os_answer(#[case] exists: bool, #[case] expected: LivenessState) {
        let mut environment = MockEnvironment::new();
        environment
            .expect_process_exists()
            .withf(|candidate| candidate.get() == 4242)
            .once()
            .returning(move |_| Ok(exists));
        let probe = LivenessProbe::new(&environment);
        assert_eq!(probe.is_alive(Some(pid(4242))), expected);
    }

    #[test]
    fn probe_failure_fails_closed() {
        let mut environment = MockEnvironment::new();
        environment
            .expect_process_exists()
            .once()
            .returning(|pid| Err(LifecycleError::Probe { pid, source: Errno::EINVAL }));
        let probe = LivenessProbe::new(&environment);
        assert_eq!(probe.is_alive(Some(pid(17))), LivenessState::NotRunning);
    }
}
