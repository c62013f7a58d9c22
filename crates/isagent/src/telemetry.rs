//! Logging for a single agent invocation.
//!
//! Events go to stderr because stdout carries the `meta-data` document. A
//! bare level such as `info` applies to the agent's own targets
//! (`isagent::lifecycle`, `isagent::dispatch`) while dependencies stay at
//! `warn`; any filter with explicit directives is used verbatim.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use isagent_config::{Config, LogFormat};

const AGENT_TARGET: &str = env!("CARGO_PKG_NAME");
const DEPENDENCY_LEVEL: LevelFilter = LevelFilter::WARN;

static SUBSCRIBER_INSTALLED: OnceCell<()> = OnceCell::new();

#[derive(Debug, thiserror::Error)]
pub(crate) enum TelemetryError {
    #[error("invalid log filter '{filter}': {message}")]
    Filter { filter: String, message: String },
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Installs the process-wide subscriber on first use; later calls are
/// no-ops.
pub(crate) fn initialise(config: &Config) -> Result<(), TelemetryError> {
    SUBSCRIBER_INSTALLED
        .get_or_try_init(|| {
            let subscriber = subscriber_for(config)?;
            tracing::subscriber::set_global_default(subscriber)?;
            Ok(())
        })
        .map(|_| ())
}

/// Expands a bare level into agent-scoped directives.
fn scoped_directives(filter: &str) -> String {
    let trimmed = filter.trim();
    match trimmed.parse::<LevelFilter>() {
        Ok(level) => format!("{DEPENDENCY_LEVEL},{AGENT_TARGET}={level}"),
        Err(_) => trimmed.to_owned(),
    }
}

fn env_filter(filter: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = scoped_directives(filter);
    EnvFilter::try_new(&directives).map_err(|error| TelemetryError::Filter {
        filter: filter.to_owned(),
        message: error.to_string(),
    })
}

fn subscriber_for(config: &Config) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter(config.log_filter())?)
        .with_target(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(builder.json().flatten_event(true).finish()),
        LogFormat::Compact => Box::new(builder.compact().finish()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::info("info", "warn,isagent=info")]
    #[case::debug_padded(" debug ", "warn,isagent=debug")]
    #[case::off("off", "warn,isagent=off")]
    #[case::explicit("isagent::lifecycle=trace", "isagent::lifecycle=trace")]
    #[case::mixed("error,isagent=debug", "error,isagent=debug")]
    fn bare_levels_are_scoped_to_the_agent(#[case] filter: &str, #[case] expected: &str) {
        assert_eq!(scoped_directives(filter), expected);
    }

    #[test]
    fn rejects_unparseable_filter() {
        let error = env_filter("isagent=notalevel").expect_err("filter is invalid");
        assert!(
            matches!(&error, TelemetryError::Filter { filter, .. } if filter == "isagent=notalevel"),
            "got {error:?}"
        );
    }

    #[rstest]
    #[case(LogFormat::Compact)]
    #[case(LogFormat::Json)]
    fn builds_a_subscriber_for_each_format(#[case] log_format: LogFormat) {
        let config = Config {
            log_format,
            ..Config::default()
        };
        assert!(subscriber_for(&config).is_ok());
    }

    #[test]
    fn repeated_initialisation_is_idempotent() {
        let config = Config::default();
        initialise(&config).expect("first initialisation");
        initialise(&config).expect("second initialisation");
    }
}
