//! Lifecycle management for the image server daemon.
//!
//! This module is split into focused submodules so each concern remains small and
//! testable:
//! - [`outcome`] defines the coarse operation results and their exit statuses.
//! - [`error`] captures the failures the process environment can report.
//! - [`environment`] abstracts the OS: spawning, signalling, existence checks.
//! - [`pid_store`] resolves the daemon's process id from its pid file.
//! - [`liveness`] decides whether a resolved identity is running.
//! - [`installation`] checks that the daemon executable is present.
//! - [`settle`] waits for the daemon to reach a state under a settle policy.
//! - [`controller`] implements the monitor/start/stop/validate flows.

mod controller;
mod environment;
mod error;
mod installation;
mod liveness;
mod outcome;
mod pid_store;
mod settle;

pub use controller::LifecycleController;
pub use environment::{DaemonLaunch, ProcessEnvironment, SystemEnvironment, TerminationSignal};
pub use error::LifecycleError;
pub use installation::InstallationCheck;
pub use liveness::{LivenessProbe, LivenessState};
pub use outcome::OcfStatus;
pub use pid_store::{PidStore, ProcessId, ProcessIdentity};

pub(crate) const LIFECYCLE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::lifecycle");
