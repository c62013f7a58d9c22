//! Best-effort lookup of the daemon's process id.
//!
//! The pid file is written by the daemon itself; this side only ever reads it
//! and treats every failure as "no identity".

use std::fmt;
use std::io;
use std::num::NonZeroU32;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use tracing::debug;

use super::LIFECYCLE_TARGET;

/// A positive process id that is safe to hand to `kill(2)`.
///
/// Zero and values above `i32::MAX` are rejected because the kernel reads
/// them as process-group or broadcast targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(NonZeroU32);

impl ProcessId {
    /// Wraps `raw` when it names a single process.
    pub fn new(raw: u32) -> Option<Self> {
        if i32::try_from(raw).is_err() {
            return None;
        }
        NonZeroU32::new(raw).map(Self)
    }

    /// The id as an unsigned integer.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// The id in the signed form expected by `kill(2)`.
    pub fn as_raw(self) -> i32 {
        i32::try_from(self.0.get()).unwrap_or(i32::MAX)
    }

    /// Parses the full contents of a pid file, ignoring surrounding
    /// whitespace.
    pub fn parse(content: &str) -> Option<Self> {
        content.trim().parse::<u32>().ok().and_then(Self::new)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(formatter)
    }
}

/// Either a process id read from the pid file, or `None` when it is absent.
pub type ProcessIdentity = Option<ProcessId>;

/// Reader for the pid file the daemon maintains.
#[derive(Debug, Clone)]
pub struct PidStore {
    path: Utf8PathBuf,
}

impl PidStore {
    /// Creates a reader for the pid file at `path`.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the pid file.
    pub fn path(&self) -> &Utf8Path {
        self.path.as_path()
    }

    /// Reads and parses the pid file.
    ///
    /// Missing, unreadable and malformed files all resolve to `None`.
    pub fn resolve(&self) -> ProcessIdentity {
        let content = match self.read() {
            Ok(content) => content,
            Err(error) => {
                debug!(
                    target: LIFECYCLE_TARGET,
                    file = %self.path,
                    error = %error,
                    "pid file unavailable"
                );
                return None;
            }
        };
        let identity = ProcessId::parse(&content);
        if identity.is_none() {
            debug!(
                target: LIFECYCLE_TARGET,
                file = %self.path,
                "pid file does not hold a usable process id"
            );
        }
        identity
    }

    fn read(&self) -> io::Result<String> {
        let filename = self.path.file_name().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "pid path has no file name")
        })?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
        dir.read_to_string(filename)
    }
}
