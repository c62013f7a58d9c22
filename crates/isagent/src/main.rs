//! Entrypoint for the image server resource agent.
//!
//! The binary delegates to [`isagent::run`], which loads configuration,
//! resolves the requested action, and exits with its OCF status.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    isagent::run(std::env::args_os(), &mut stdout, &mut stderr)
}
