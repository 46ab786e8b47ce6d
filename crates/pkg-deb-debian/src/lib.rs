//! Debian policy rules for pkg-deb
//!
//! This crate turns loosely-structured application metadata into the values
//! a Debian binary package control file expects, and renders that file.
//!
//! # Features
//!
//! - **Name Sanitization**: Lowercase, scope-flattened names in the Debian
//!   alphabet
//! - **Version Conversion**: SemVer pre-releases rewritten with `~`, plus a
//!   dpkg-compatible version comparison
//! - **Maintainer Derivation**: Free text or structured authors to
//!   `Name <email>`
//! - **Description Wrapping**: Single-line synopsis and wrapped extended
//!   description
//! - **Control Rendering**: `{{key}}` templates with an explicit presence
//!   check, and stanza validation
//!
//! # Example Usage
//!
//! ```rust
//! use pkg_deb_core::{PackageManifest, PackageOverrides};
//! use pkg_deb_debian::{ControlRenderer, OptionsNormalizer};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = PackageManifest::from_json(
//!     r#"{ "name": "nori-pkg", "version": "1.0.0-beta1", "description": "pkg for Nori-cat.",
//!          "author": "Nori <nori@example.test>" }"#,
//! )?;
//! let overrides = PackageOverrides { arch: Some("amd64".to_string()), ..Default::default() };
//!
//! let options = OptionsNormalizer::new().normalize(&manifest, &overrides, 4096)?;
//! assert_eq!(options.version, "1.0.0~beta1");
//!
//! let control = ControlRenderer::new().render(&options)?;
//! assert!(control.starts_with("Package: nori-pkg\n"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error types and result handling
//! - [`name`]: Package name sanitization
//! - [`version`]: Version transformation and comparison
//! - [`maintainer`]: Author parsing
//! - [`description`]: Synopsis and extended description normalization
//! - [`normalize`]: Options derivation
//! - [`template`]: Placeholder templates
//! - [`control`]: Control file rendering
//! - [`validation`]: Control stanza validation

pub mod control;
pub mod description;
pub mod error;
pub mod maintainer;
pub mod name;
pub mod normalize;
pub mod template;
pub mod validation;
pub mod version;

// Re-export commonly used types
pub use control::{ControlRenderer, DEFAULT_CONTROL_TEMPLATE};
pub use description::{normalize_description, normalize_extended_description};
pub use error::{DebianError, Result};
pub use maintainer::{Author, AuthorParser};
pub use name::sanitize_name;
pub use normalize::OptionsNormalizer;
pub use template::{Template, TemplateData};
pub use validation::{ControlValidator, ValidationResult};
pub use version::{compare_versions, transform_version, VersionHandler};
