//! Error types for daemon lifecycle operations.
//!
//! None of these escape an operation: the controller logs them and folds them
//! into the nearest [`OcfStatus`](super::OcfStatus).

use std::io;

use camino::Utf8PathBuf;
use nix::errno::Errno;
use thiserror::Error;

use super::environment::TerminationSignal;
use super::pid_store::ProcessId;

/// Failures reported by a [`ProcessEnvironment`](super::ProcessEnvironment).
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The existence check for a process failed.
    #[error("failed to check whether process {pid} exists: {source}")]
    Probe {
        /// Process that was looked up.
        pid: ProcessId,
        /// Errno returned by `kill(pid, 0)`.
        #[source]
        source: Errno,
    },
    /// A termination signal could not be delivered.
    #[error("failed to send {signal} to process {pid}: {source}")]
    Signal {
        /// Process the signal was addressed to.
        pid: ProcessId,
        /// Signal that was refused.
        signal: TerminationSignal,
        /// Errno returned by `kill(2)`.
        #[source]
        source: Errno,
    },
    /// The daemon executable could not be spawned.
    #[error("failed to launch daemon binary '{binary}': {source}")]
    Launch {
        /// Executable that failed to start.
        binary: Utf8PathBuf,
        /// Spawn failure.
        #[source]
        source: io::Error,
    },
}

impl LifecycleError {
    /// Whether the target process had already gone when the OS was asked
    /// about it.
    pub fn is_no_such_process(&self) -> bool {
        matches!(
            self,
            Self::Probe {
                source: Errno::ESRCH,
                ..
            } | Self::Signal {
                source: Errno::ESRCH,
                ..
            }
        )
    }
}
