//! Maps the action named by the cluster manager onto a lifecycle operation.

use std::io::Write;
use std::str::FromStr;

use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::AppError;
use crate::lifecycle::{LifecycleController, OcfStatus, ProcessEnvironment};
use crate::metadata::write_metadata;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Actions the agent implements. Names are matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "kebab-case")]
pub(crate) enum AgentAction {
    Start,
    Stop,
    Monitor,
    MetaData,
    ValidateAll,
}

impl AgentAction {
    /// Whether the action depends on configuration. `meta-data` prints a
    /// static document and runs even when configuration cannot be loaded.
    pub(crate) const fn needs_configuration(self) -> bool {
        !matches!(self, Self::MetaData)
    }

    /// Resolves the action token, rejecting absent or unknown names.
    pub(crate) fn resolve(token: Option<&str>) -> Result<Self, AppError> {
        let token = token.ok_or(AppError::MissingAction)?;
        Self::from_str(token).map_err(|_| AppError::UnsupportedAction(token.to_owned()))
    }
}

/// Prints the resource agent document.
pub(crate) fn describe<W: Write>(stdout: &mut W) -> Result<OcfStatus, AppError> {
    write_metadata(stdout).map_err(AppError::WriteMetadata)?;
    Ok(OcfStatus::Success)
}

/// Runs one resolved action against the lifecycle controller.
pub(crate) struct CommandDispatcher<'a, E: ?Sized> {
    controller: LifecycleController<'a, E>,
}

impl<'a, E> CommandDispatcher<'a, E>
where
    E: ProcessEnvironment + ?Sized,
{
    pub(crate) fn new(controller: LifecycleController<'a, E>) -> Self {
        Self { controller }
    }

    /// Executes `action`, writing any document it produces to `stdout`.
    ///
    /// `ignored` holds the tokens that followed the action; they are logged
    /// and otherwise disregarded.
    pub(crate) fn dispatch<W: Write>(
        &self,
        action: AgentAction,
        ignored: &[String],
        stdout: &mut W,
    ) -> Result<OcfStatus, AppError> {
        if !ignored.is_empty() {
            debug!(
                target: DISPATCH_TARGET,
                %action,
                ignored = ?ignored,
                "ignoring extra arguments"
            );
        }
        let status = match action {
            AgentAction::Start => self.controller.start(),
            AgentAction::Stop => self.controller.stop(),
            AgentAction::Monitor => self.controller.monitor(),
            AgentAction::ValidateAll => self.controller.validate_all(),
            AgentAction::MetaData => describe(stdout)?,
        };
        info!(target: DISPATCH_TARGET, %action, %status, "action finished");
        Ok(status)
    }
}
