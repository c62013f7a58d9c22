//! The operating-system surface the lifecycle controller depends on.
//!
//! Everything the controller does to the outside world goes through
//! [`ProcessEnvironment`], so the state machine can be driven by fakes in
//! tests and by [`SystemEnvironment`] in production.

use std::cell::RefCell;
use std::fmt;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use tracing::{debug, warn};

use super::LIFECYCLE_TARGET;
use super::error::LifecycleError;
use super::pid_store::ProcessId;

/// Termination request strength used during a stop escalation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationSignal {
    /// Polite request the daemon may handle (`SIGTERM`).
    Graceful,
    /// Un-ignorable kill (`SIGKILL`).
    Forceful,
}

impl TerminationSignal {
    /// The POSIX signal delivered for this request.
    pub const fn as_signal(self) -> Signal {
        match self {
            Self::Graceful => Signal::SIGTERM,
            Self::Forceful => Signal::SIGKILL,
        }
    }
}

impl fmt::Display for TerminationSignal {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_signal().as_str())
    }
}

/// Executable and startup flag used to bring the daemon up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonLaunch {
    binary: Utf8PathBuf,
    flag: String,
}

impl DaemonLaunch {
    /// Describes a launch of `binary` with the single argument `flag`.
    pub fn new(binary: impl Into<Utf8PathBuf>, flag: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            flag: flag.into(),
        }
    }

    /// Path to the daemon executable.
    pub fn binary(&self) -> &Utf8Path {
        self.binary.as_path()
    }

    /// Startup flag passed to the executable.
    pub fn flag(&self) -> &str {
        self.flag.as_str()
    }
}

/// Capabilities the lifecycle controller needs from the host.
pub trait ProcessEnvironment {
    /// Reports whether a process with this id currently exists.
    fn process_exists(&self, pid: ProcessId) -> Result<bool, LifecycleError>;

    /// Delivers a termination signal.
    fn send_signal(&self, pid: ProcessId, signal: TerminationSignal)
    -> Result<(), LifecycleError>;

    /// Starts the daemon without waiting for it.
    fn launch(&self, launch: &DaemonLaunch) -> Result<(), LifecycleError>;

    /// Reports whether a filesystem entry exists at `path`.
    fn artifact_exists(&self, path: &Utf8Path) -> bool;

    /// Blocks for `duration`.
    fn pause(&self, duration: Duration);
}

/// Production environment backed by `kill(2)` and `std::process`.
#[derive(Debug, Default)]
pub struct SystemEnvironment {
    launched: RefCell<Vec<Child>>,
}

impl SystemEnvironment {
    /// Creates an environment with no launched children.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects launched children that already exited so they do not linger
    /// as zombies that `kill(pid, 0)` would still report as present.
    fn reap_launched(&self) {
        self.launched
            .borrow_mut()
            .retain_mut(|child| match child.try_wait() {
                Ok(Some(status)) => {
                    debug!(
                        target: LIFECYCLE_TARGET,
                        pid = child.id(),
                        status = %status,
                        "launched process exited"
                    );
                    false
                }
                Ok(None) => true,
                Err(error) => {
                    warn!(
                        target: LIFECYCLE_TARGET,
                        pid = child.id(),
                        error = %error,
                        "failed to poll launched process"
                    );
                    false
                }
            });
    }
}

impl ProcessEnvironment for SystemEnvironment {
    fn process_exists(&self, pid: ProcessId) -> Result<bool, LifecycleError> {
        self.reap_launched();
        match kill(Pid::from_raw(pid.as_raw()), None) {
            // EPERM still proves a process holds the id.
            Ok(()) | Err(Errno::EPERM) => Ok(true),
            Err(Errno::ESRCH) => Ok(false),
            Err(source) => Err(LifecycleError::Probe { pid, source }),
        }
    }

    fn send_signal(
        &self,
        pid: ProcessId,
        signal: TerminationSignal,
    ) -> Result<(), LifecycleError> {
        kill(Pid::from_raw(pid.as_raw()), signal.as_signal())
            .map_err(|source| LifecycleError::Signal {
                pid,
                signal,
                source,
            })
    }

    fn launch(&self, launch: &DaemonLaunch) -> Result<(), LifecycleError> {
        let mut command = Command::new(launch.binary().as_std_path());
        command.arg(launch.flag());
        // Detach stdio so the resource manager is not left waiting on pipes
        // the daemon inherited.
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let child = command.spawn().map_err(|source| LifecycleError::Launch {
            binary: launch.binary().to_path_buf(),
            source,
        })?;
        debug!(
            target: LIFECYCLE_TARGET,
            pid = child.id(),
            binary = %launch.binary(),
            "daemon launch issued"
        );
        self.launched.borrow_mut().push(child);
        Ok(())
    }

    fn artifact_exists(&self, path: &Utf8Path) -> bool {
        path.as_std_path().metadata().is_ok()
    }

    fn pause(&self, duration: Duration) {
        thread::sleep(duration);
    }
}
