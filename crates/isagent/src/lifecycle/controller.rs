//! High-level orchestration for the resource agent actions.
//!
//! Every action is evaluated from scratch: the pid file is re-read and the
//! process re-probed on each call, and nothing is remembered between
//! invocations. Starting a running daemon and stopping a stopped one are
//! no-ops that report success.

use isagent_config::{Config, SettlePolicy};
use tracing::{error, info, warn};

use super::LIFECYCLE_TARGET;
use super::environment::{DaemonLaunch, ProcessEnvironment, TerminationSignal};
use super::installation::InstallationCheck;
use super::liveness::{LivenessProbe, LivenessState};
use super::outcome::OcfStatus;
use super::pid_store::{PidStore, ProcessId};
use super::settle::settle;

/// Escalation order used by `stop`. There is no third round.
const ESCALATION: [TerminationSignal; 2] =
    [TerminationSignal::Graceful, TerminationSignal::Forceful];

/// Lifecycle state machine for the image server daemon.
pub struct LifecycleController<'a, E: ?Sized> {
    environment: &'a E,
    pid_store: PidStore,
    installation: InstallationCheck,
    launch: DaemonLaunch,
    settle_policy: SettlePolicy,
}

impl<'a, E> LifecycleController<'a, E>
where
    E: ProcessEnvironment + ?Sized,
{
    /// Assembles a controller from its parts. The installation check
    /// targets the launch binary.
    pub fn new(
        environment: &'a E,
        pid_store: PidStore,
        launch: DaemonLaunch,
        settle_policy: SettlePolicy,
    ) -> Self {
        let installation = InstallationCheck::new(launch.binary());
        Self {
            environment,
            pid_store,
            installation,
            launch,
            settle_policy,
        }
    }

    /// Builds a controller from the shared configuration.
    pub fn from_config(config: &Config, environment: &'a E) -> Self {
        Self::new(
            environment,
            PidStore::new(config.pid_path()),
            DaemonLaunch::new(config.daemon_binary(), config.daemon_flag()),
            config.settle_policy(),
        )
    }

    /// Reports whether the daemon is running.
    pub fn monitor(&self) -> OcfStatus {
        match self.liveness() {
            LivenessState::Running => OcfStatus::Success,
            LivenessState::NotRunning => OcfStatus::NotRunning,
        }
    }

    /// Launches the daemon unless it is already running.
    pub fn start(&self) -> OcfStatus {
        if self.liveness().is_running() {
            info!(target: LIFECYCLE_TARGET, "daemon already running");
            return OcfStatus::Success;
        }
        info!(
            target: LIFECYCLE_TARGET,
            binary = %self.launch.binary(),
            flag = self.launch.flag(),
            "launching daemon"
        );
        if let Err(error) = self.environment.launch(&self.launch) {
            error!(target: LIFECYCLE_TARGET, error = %error, "daemon launch failed");
            return OcfStatus::GenericError;
        }
        if settle(self.environment, self.settle_policy, || {
            self.liveness().is_running()
        }) {
            info!(target: LIFECYCLE_TARGET, "daemon started");
            OcfStatus::Success
        } else {
            error!(
                target: LIFECYCLE_TARGET,
                pid_file = %self.pid_store.path(),
                "daemon did not come up within the settle window"
            );
            OcfStatus::GenericError
        }
    }

    /// Stops the daemon, escalating from `SIGTERM` to `SIGKILL`.
    pub fn stop(&self) -> OcfStatus {
        if !self.liveness().is_running() {
            info!(target: LIFECYCLE_TARGET, "daemon already stopped");
            return OcfStatus::Success;
        }
        let Some(pid) = self.pid_store.resolve() else {
            info!(
                target: LIFECYCLE_TARGET,
                "pid file disappeared after the liveness check; daemon already gone"
            );
            return OcfStatus::Success;
        };
        for signal in ESCALATION {
            if self.terminate(pid, signal) {
                info!(target: LIFECYCLE_TARGET, pid = pid.get(), %signal, "daemon stopped");
                return OcfStatus::Success;
            }
        }
        error!(
            target: LIFECYCLE_TARGET,
            pid = pid.get(),
            "daemon survived every termination signal"
        );
        OcfStatus::GenericError
    }

    /// Checks that the daemon executable is installed.
    pub fn validate_all(&self) -> OcfStatus {
        if self.installation.is_installed(self.environment) {
            OcfStatus::Success
        } else {
            warn!(
                target: LIFECYCLE_TARGET,
                binary = %self.installation.artifact(),
                "daemon executable not found"
            );
            OcfStatus::NotInstalled
        }
    }

    fn liveness(&self) -> LivenessState {
        LivenessProbe::new(self.environment).is_alive(self.pid_store.resolve())
    }

    /// Runs one escalation round and reports whether the daemon is gone.
    ///
    /// A signal accepted by the kernel says nothing about whether the daemon
    /// exited, so only the settle probe decides. A signal rejected with
    /// "no such process" means the daemon already exited.
    fn terminate(&self, pid: ProcessId, signal: TerminationSignal) -> bool {
        info!(target: LIFECYCLE_TARGET, pid = pid.get(), %signal, "signalling daemon");
        if let Err(error) = self.environment.send_signal(pid, signal) {
            if error.is_no_such_process() {
                return true;
            }
            warn!(
                target: LIFECYCLE_TARGET,
                error = %error,
                "signal delivery failed; re-checking daemon"
            );
        }
        settle(self.environment, self.settle_policy, || {
            !self.liveness().is_running()
        })
    }
}
