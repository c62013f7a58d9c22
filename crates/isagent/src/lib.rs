//! OCF resource agent for the LS-CAT image server.
//!
//! The cluster manager invokes the agent once per action (`start`, `stop`,
//! `monitor`, `meta-data`, `validate-all`) and reads the outcome from the exit
//! status. The runtime owns argument splitting, configuration bootstrapping,
//! and dispatch; the [`lifecycle`] module owns the daemon state machine. Both
//! the configuration loader and the process environment can be substituted so
//! tests exercise the full flow without touching the host.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

mod cli;
mod config;
mod dispatch;
mod errors;
pub mod lifecycle;
mod metadata;
mod telemetry;

#[cfg(test)]
mod tests;

use cli::Cli;
use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
use dispatch::{AgentAction, CommandDispatcher, describe};
pub(crate) use errors::AppError;
use lifecycle::{LifecycleController, OcfStatus, ProcessEnvironment, SystemEnvironment};

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the fields of
/// `isagent_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--pid-path",
    "--daemon-binary",
    "--daemon-flag",
    "--settle-timeout-ms",
    "--settle-interval-ms",
    "--settle-backoff",
    "--log-filter",
    "--log-format",
];

/// Bundles the IO streams provided to the agent runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct AgentRunner<'a, W: Write, E: Write, L: ConfigLoader, P: ?Sized> {
    io: IoStreams<'a, W, E>,
    loader: &'a L,
    environment: &'a P,
}

impl<'a, W, E, L, P> AgentRunner<'a, W, E, L, P>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
    P: ProcessEnvironment + ?Sized,
{
    fn new(io: IoStreams<'a, W, E>, loader: &'a L, environment: &'a P) -> Self {
        Self {
            io,
            loader,
            environment,
        }
    }

    fn run<I>(&mut self, args: I) -> OcfStatus
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli = match Cli::try_parse_from(prepare_cli_arguments(&args, &split)) {
            Ok(cli) => cli,
            Err(error) => return self.report_usage(&error),
        };

        // Unknown actions are rejected before configuration is read or the
        // daemon is looked at.
        let action = match AgentAction::resolve(cli.action.as_deref()) {
            Ok(action) => action,
            Err(error) => {
                self.report(&error);
                return OcfStatus::Unimplemented;
            }
        };

        if !action.needs_configuration() {
            let described = describe(&mut *self.io.stdout);
            return self.finish(described);
        }

        let result = self
            .loader
            .load(&split.config_arguments)
            .and_then(|config| {
                if let Err(error) = telemetry::initialise(&config) {
                    self.report(&AppError::from(error));
                }
                let controller = LifecycleController::from_config(&config, self.environment);
                CommandDispatcher::new(controller).dispatch(
                    action,
                    &cli.arguments,
                    &mut *self.io.stdout,
                )
            });

        self.finish(result)
    }

    fn finish(&mut self, result: Result<OcfStatus, AppError>) -> OcfStatus {
        match result {
            Ok(status) => status,
            Err(error) => {
                self.report(&error);
                OcfStatus::GenericError
            }
        }
    }

    fn report(&mut self, error: &AppError) {
        let _ = writeln!(self.io.stderr, "isagent: {error}");
    }

    fn report_usage(&mut self, error: &clap::Error) -> OcfStatus {
        match error.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                let _ = write!(self.io.stdout, "{error}");
                OcfStatus::Success
            }
            _ => {
                let _ = write!(self.io.stderr, "{error}");
                OcfStatus::Unimplemented
            }
        }
    }
}

/// Runs the agent using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let environment = SystemEnvironment::new();
    run_with(args, stdout, stderr, &OrthoConfigLoader, &environment).into()
}

pub(crate) fn run_with<I, W, E, L, P>(
    args: I,
    stdout: &mut W,
    stderr: &mut E,
    loader: &L,
    environment: &P,
) -> OcfStatus
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
    P: ProcessEnvironment + ?Sized,
{
    let io = IoStreams::new(stdout, stderr);
    AgentRunner::new(io, loader, environment).run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if let Some(rest) = args.get(split.command_start..) {
        cli_arguments.extend(rest.iter().cloned());
    }
    cli_arguments
}
