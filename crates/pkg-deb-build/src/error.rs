//! Error types for the packaging pipeline

use std::path::PathBuf;

use thiserror::Error;

/// Pipeline-specific error types
#[derive(Error, Debug)]
pub enum BuildError {
    /// Manifest missing or malformed
    #[error("Failed to load manifest {path:?}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// Laying out the staging tree failed
    #[error("Failed to stage {path:?}: {reason}")]
    Staging { path: PathBuf, reason: String },

    /// Unknown maintainer script name
    #[error(
        "Unsupported maintainer script {name:?}, expected one of preinst, postinst, prerm, \
         postrm"
    )]
    InvalidScript { name: String },

    /// The packaging tool failed or could not be started
    #[error("{program} failed ({status}):\n{output}")]
    Backend { program: String, status: String, output: String },

    /// The packaging tool ran too long
    #[error("{program} timed out after {duration_secs} seconds")]
    BackendTimeout { program: String, duration_secs: u64 },

    /// The backend reported success but produced no archive
    #[error("Expected package archive not found: {path:?}")]
    ArtifactMissing { path: PathBuf },

    /// Copying the archive to its destination failed
    #[error("Failed to place package at {path:?}: {reason}")]
    Placement { path: PathBuf, reason: String },

    /// A pipeline stage was entered out of order
    #[error("Invalid pipeline transition from {from} to {to}")]
    InvalidState { from: String, to: String },

    /// Debian policy error
    #[error(transparent)]
    Debian(#[from] pkg_deb_debian::DebianError),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] pkg_deb_core::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    /// Create a manifest error
    pub fn manifest(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Manifest { path: path.into(), reason: reason.to_string() }
    }

    /// Create a staging error
    pub fn staging(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Staging { path: path.into(), reason: reason.to_string() }
    }

    /// Create a backend failure error
    pub fn backend(
        program: impl Into<String>,
        status: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self::Backend { program: program.into(), status: status.into(), output: output.into() }
    }

    /// Create a placement error
    pub fn placement(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Placement { path: path.into(), reason: reason.to_string() }
    }

    /// Check whether the error was caused by caller input rather than the
    /// environment or the backend
    pub fn is_input_error(&self) -> bool {
        match self {
            Self::Manifest { .. } | Self::InvalidScript { .. } => true,
            Self::Debian(e) => e.is_input_error(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_relays_output() {
        let err = BuildError::backend(
            "dpkg-deb",
            "exit status: 2",
            "dpkg-deb: error: parsing file 'DEBIAN/control'",
        );
        let message = err.to_string();

        assert!(message.starts_with("dpkg-deb failed (exit status: 2)"));
        assert!(message.ends_with("dpkg-deb: error: parsing file 'DEBIAN/control'"));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_input_errors() {
        assert!(BuildError::manifest("/tmp/package.json", "missing").is_input_error());
        assert!(BuildError::InvalidScript { name: "config".to_string() }.is_input_error());
        assert!(BuildError::from(pkg_deb_debian::DebianError::MissingDescription).is_input_error());
        assert!(!BuildError::placement("/dest", "disk full").is_input_error());
    }
}
