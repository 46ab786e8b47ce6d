//! Core types for pkg-deb
//!
//! This crate provides the data model shared by every stage of the
//! packaging pipeline: the parsed application manifest, the defaults derived
//! from it, caller overrides and the canonical [`PackageOptions`] record.

pub mod build;
pub mod defaults;
pub mod error;
pub mod manifest;
pub mod options;

pub use build::{BuildResult, BuildStatus};
pub use defaults::ManifestDefaults;
pub use error::{Error, Result};
pub use manifest::{PackageManifest, Person};
pub use options::{PackageOptions, PackageOverrides};
