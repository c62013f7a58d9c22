//! Operation results reported to the cluster resource manager.

use std::fmt;
use std::process::ExitCode;

/// Outcome of a resource agent action, using the OCF exit status numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcfStatus {
    /// The daemon is in (or was brought to) the requested state.
    Success,
    /// The requested state could not be reached.
    GenericError,
    /// The action is missing or unknown.
    Unimplemented,
    /// The daemon executable is not installed.
    NotInstalled,
    /// `monitor` found the daemon stopped.
    NotRunning,
}

impl OcfStatus {
    /// Numeric exit status understood by the resource manager.
    pub const fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::GenericError => 1,
            Self::Unimplemented => 3,
            Self::NotInstalled => 5,
            Self::NotRunning => 7,
        }
    }
}

impl fmt::Display for OcfStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::GenericError => "generic error",
            Self::Unimplemented => "unimplemented",
            Self::NotInstalled => "not installed",
            Self::NotRunning => "not running",
        };
        write!(formatter, "{label} ({})", self.code())
    }
}

impl From<OcfStatus> for ExitCode {
    fn from(status: OcfStatus) -> Self {
        Self::from(status.code())
    }
}
