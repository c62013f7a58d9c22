//! Shared configuration for the image server resource agent.
//!
//! Configuration is layered by `ortho_config`: built-in defaults, then an
//! optional TOML file (`--config-path` or `ISAGENT_CONFIG_PATH`), then
//! `ISAGENT_*` environment variables, and finally command-line flags.

mod defaults;
mod logging;
mod settle;

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use defaults::{
    DEFAULT_DAEMON_BINARY, DEFAULT_DAEMON_FLAG, DEFAULT_LOG_FILTER, DEFAULT_PID_PATH,
    DEFAULT_SETTLE_BACKOFF, DEFAULT_SETTLE_INTERVAL_MS, DEFAULT_SETTLE_TIMEOUT_MS,
    default_daemon_binary, default_daemon_flag, default_log_filter, default_log_filter_string,
    default_log_format, default_pid_path, default_settle_backoff, default_settle_interval_ms,
    default_settle_timeout_ms,
};
pub use logging::{LogFormat, LogFormatParseError};
pub use settle::SettlePolicy;

/// Runtime configuration for the resource agent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "ISAGENT")]
pub struct Config {
    /// File the daemon writes its process id to.
    #[serde(default = "defaults::default_pid_path")]
    #[ortho_config(default = defaults::default_pid_path())]
    pub pid_path: Utf8PathBuf,
    /// Executable launched by `start` and checked by `validate-all`.
    #[serde(default = "defaults::default_daemon_binary")]
    #[ortho_config(default = defaults::default_daemon_binary())]
    pub daemon_binary: Utf8PathBuf,
    /// Flag passed to the daemon so it detaches into the background.
    #[serde(default = "defaults::default_daemon_flag")]
    #[ortho_config(default = defaults::default_daemon_flag())]
    pub daemon_flag: String,
    /// Upper bound on each settle wait, in milliseconds.
    #[serde(default = "defaults::default_settle_timeout_ms")]
    #[ortho_config(default = defaults::DEFAULT_SETTLE_TIMEOUT_MS)]
    pub settle_timeout_ms: u64,
    /// First pause before re-probing, in milliseconds.
    #[serde(default = "defaults::default_settle_interval_ms")]
    #[ortho_config(default = defaults::DEFAULT_SETTLE_INTERVAL_MS)]
    pub settle_interval_ms: u64,
    /// Multiplier applied to the pause after each unsuccessful probe.
    #[serde(default = "defaults::default_settle_backoff")]
    #[ortho_config(default = defaults::DEFAULT_SETTLE_BACKOFF)]
    pub settle_backoff: u32,
    /// `tracing` filter directive.
    #[serde(default = "defaults::default_log_filter_string")]
    #[ortho_config(default = defaults::default_log_filter_string())]
    pub log_filter: String,
    /// Log output format.
    #[serde(default = "defaults::default_log_format")]
    #[ortho_config(default = defaults::default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pid_path: default_pid_path(),
            daemon_binary: default_daemon_binary(),
            daemon_flag: default_daemon_flag(),
            settle_timeout_ms: DEFAULT_SETTLE_TIMEOUT_MS,
            settle_interval_ms: DEFAULT_SETTLE_INTERVAL_MS,
            settle_backoff: DEFAULT_SETTLE_BACKOFF,
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Location of the daemon's pid file.
    pub fn pid_path(&self) -> &Utf8Path {
        self.pid_path.as_path()
    }

    /// Location of the daemon executable.
    pub fn daemon_binary(&self) -> &Utf8Path {
        self.daemon_binary.as_path()
    }

    /// Startup flag passed to the daemon executable.
    pub fn daemon_flag(&self) -> &str {
        self.daemon_flag.as_str()
    }

    /// Log filter expression.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Log output format.
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Settle policy used after launching or signalling the daemon.
    pub fn settle_policy(&self) -> SettlePolicy {
        SettlePolicy::new(
            Duration::from_millis(self.settle_timeout_ms),
            Duration::from_millis(self.settle_interval_ms),
            self.settle_backoff,
        )
    }
}
