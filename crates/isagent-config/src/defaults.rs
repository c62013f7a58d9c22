//! Built-in values used when no other configuration layer sets a field.

use camino::Utf8PathBuf;

/// Pid file written by the image server when it daemonises.
pub const DEFAULT_PID_PATH: &str = "/var/run/ls-cat/is.pid";

/// Installed image server executable.
pub const DEFAULT_DAEMON_BINARY: &str = "/pf/bin/linux-x86_64/is";

/// Flag asking the image server to detach into the background.
pub const DEFAULT_DAEMON_FLAG: &str = "-d";

/// Default upper bound for each settle wait.
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 2_000;

/// Default first pause before re-probing the daemon.
pub const DEFAULT_SETTLE_INTERVAL_MS: u64 = 2_000;

/// Default growth factor for the settle poll interval.
pub const DEFAULT_SETTLE_BACKOFF: u32 = 2;

/// Default log filter expression used by the agent.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default pid file location.
pub fn default_pid_path() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_PID_PATH)
}

/// Default daemon executable location.
pub fn default_daemon_binary() -> Utf8PathBuf {
    Utf8PathBuf::from(DEFAULT_DAEMON_BINARY)
}

/// Owned startup flag, for serde defaults.
pub fn default_daemon_flag() -> String {
    DEFAULT_DAEMON_FLAG.to_owned()
}

/// Settle timeout default, for serde.
pub const fn default_settle_timeout_ms() -> u64 {
    DEFAULT_SETTLE_TIMEOUT_MS
}

/// Settle interval default, for serde.
pub const fn default_settle_interval_ms() -> u64 {
    DEFAULT_SETTLE_INTERVAL_MS
}

/// Settle backoff default, for serde.
pub const fn default_settle_backoff() -> u32 {
    DEFAULT_SETTLE_BACKOFF
}

/// Default log filter expression used by the agent.
pub fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format. Compact lines read best in the cluster log.
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::Compact
}
