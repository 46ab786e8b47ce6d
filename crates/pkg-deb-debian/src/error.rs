//! Error types for Debian policy handling

use thiserror::Error;

/// Debian-specific error types
#[derive(Error, Debug)]
pub enum DebianError {
    /// Invalid package name
    #[error("Invalid package name {name:?}: {reason}")]
    InvalidPackageName { name: String, reason: String },

    /// Invalid version format
    #[error("Invalid version format: {version} - {reason}")]
    InvalidVersion { version: String, reason: String },

    /// Author text could not be parsed
    #[error("Invalid author {author:?}: {reason}")]
    InvalidAuthor { author: String, reason: String },

    /// Neither description nor extended description is available
    #[error(
        "No description or product description provided. Set a description in the \
         application's package.json or pass one in the package options"
    )]
    MissingDescription,

    /// No target architecture was given
    #[error("No target architecture provided")]
    MissingArchitecture,

    /// A template references a field that has no value
    #[error("Template references missing field: {field}")]
    MissingField { field: String },

    /// Template text is malformed
    #[error("Invalid template at line {line}: {reason}")]
    InvalidTemplate { line: usize, reason: String },

    /// Invalid debian control file
    #[error("Invalid debian control file for package {package}: {reason}")]
    InvalidControlFile { package: String, reason: String },

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] pkg_deb_core::Error),
}

/// Result type alias for Debian operations
pub type Result<T> = std::result::Result<T, DebianError>;

impl DebianError {
    /// Create an invalid package name error
    pub fn invalid_package_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPackageName { name: name.into(), reason: reason.into() }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidVersion { version: version.into(), reason: reason.into() }
    }

    /// Create an invalid author error
    pub fn invalid_author(author: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidAuthor { author: author.into(), reason: reason.into() }
    }

    /// Create a missing template field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField { field: field.into() }
    }

    /// Create an invalid template error
    pub fn invalid_template(line: usize, reason: impl Into<String>) -> Self {
        Self::InvalidTemplate { line, reason: reason.into() }
    }

    /// Create an invalid control file error
    pub fn invalid_control_file(package: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidControlFile { package: package.into(), reason: reason.into() }
    }

    /// Check whether the error was caused by caller input rather than the
    /// environment
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Core(_))
    }
}
