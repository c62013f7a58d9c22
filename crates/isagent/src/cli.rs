//! Command-line surface of the resource agent.
//!
//! The orchestrator passes the action as a bare positional token, so the
//! action is captured as a string and resolved by the dispatcher rather than
//! by clap. That keeps unknown actions on the "unimplemented" exit path
//! instead of clap's usage error path.

use clap::Parser;

/// Resource agent for the LS-CAT image server.
#[derive(Parser, Debug)]
#[command(name = "isagent", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// The action requested by the cluster manager (for example `monitor`).
    #[arg(value_name = "ACTION", allow_hyphen_values = true)]
    pub(crate) action: Option<String>,
    /// Extra arguments; accepted and ignored.
    #[arg(
        value_name = "ARG",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) arguments: Vec<String>,
}
