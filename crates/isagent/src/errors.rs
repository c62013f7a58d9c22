//! Error types for the agent runtime.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("no action given; expected one of start, stop, monitor, meta-data, validate-all")]
    MissingAction,
    #[error("unsupported action '{0}'")]
    UnsupportedAction(String),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("failed to write resource agent metadata: {0}")]
    WriteMetadata(io::Error),
}
