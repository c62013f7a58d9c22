//! Configuration loading helpers for the resource agent.
//!
//! The orchestrator calls the agent as `isagent <action>`, but operators may
//! put configuration flags in front of the action. The logic here filters the
//! flags destined for `ortho-config` so the loader only receives supported
//! flags while the runtime operates on the remaining action tokens.
//!
//! Pacemaker hands resource parameters to the agent as `OCF_RESKEY_<name>`
//! environment variables. Those are folded in as configuration flags, so
//! they outrank the `ISAGENT_*` environment and the configuration file but
//! yield to a flag given explicitly on the command line.

use std::env;
use std::ffi::{OsStr, OsString};

use isagent_config::Config;
use ortho_config::OrthoConfig;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration for the agent.
    ///
    /// # Flag Ordering
    ///
    /// Configuration flags (listed in `CONFIG_CLI_FLAGS`) must appear before
    /// the action token. Flags after the action are ignored with the rest of
    /// the trailing arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

/// Resource parameters advertised by `meta-data`, with the flag each one
/// feeds.
pub(crate) const RESOURCE_PARAMETERS: &[(&str, &str)] = &[
    ("OCF_RESKEY_pid_path", "--pid-path"),
    ("OCF_RESKEY_daemon_binary", "--daemon-binary"),
];

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        let args = with_resource_parameters(args, |key| env::var_os(key));
        Config::load_from_iter(args).map_err(AppError::LoadConfiguration)
    }
}

/// Appends a flag for every resource parameter set in the environment
/// unless the same flag was already given.
///
/// Empty parameters are skipped; Pacemaker exports unset optional
/// parameters that way.
pub(crate) fn with_resource_parameters<F>(args: &[OsString], lookup: F) -> Vec<OsString>
where
    F: Fn(&str) -> Option<OsString>,
{
    let mut merged = args.to_vec();
    for &(key, flag) in RESOURCE_PARAMETERS {
        if has_flag(args, flag) {
            continue;
        }
        match lookup(key) {
            Some(value) if !value.is_empty() => {
                merged.push(OsString::from(flag));
                merged.push(value);
            }
            _ => {}
        }
    }
    merged
}

fn has_flag(args: &[OsString], flag: &str) -> bool {
    args.iter().skip(1).any(|argument| {
        let text = argument.to_string_lossy();
        text == flag
            || text
                .strip_prefix(flag)
                .is_some_and(|rest| rest.starts_with('='))
    })
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (argument_text.as_ref(), false),
        };

        if super::CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value,
            };
        }

        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered: Vec<OsString> = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_value = false;

    for argument in &args[1..] {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }

        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}
