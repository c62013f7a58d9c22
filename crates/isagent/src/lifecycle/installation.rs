//! Presence check for the daemon executable.

use camino::{Utf8Path, Utf8PathBuf};

use super::environment::ProcessEnvironment;

/// Checks that the daemon executable is installed where it is expected.
#[derive(Debug, Clone)]
pub struct InstallationCheck {
    artifact: Utf8PathBuf,
}

impl InstallationCheck {
    /// Creates a check for the executable at `artifact`.
    pub fn new(artifact: impl Into<Utf8PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
        }
    }

    /// Path that must exist.
    pub fn artifact(&self) -> &Utf8Path {
        self.artifact.as_path()
    }

    /// Performs a single, uncached existence check.
    pub fn is_installed<E>(&self, environment: &E) -> bool
    where
        E: ProcessEnvironment + ?Sized,
    {
        environment.artifact_exists(&self.artifact)
    }
}
