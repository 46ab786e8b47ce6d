//! Package assembly pipeline for pkg-deb
//!
//! This crate turns a built application plus its metadata into a `.deb`:
//! it resolves the manifest, stages the package tree, renders the control
//! file, runs the native packaging backend and places the archive.
//!
//! ```no_run
//! use pkg_deb_config::Config;
//!
//! # async fn run() -> pkg_deb_build::Result<()> {
//! let mut config = Config::new("target/release/lilbins", "dist", "amd64");
//! config.package.name = Some("lilbins".to_string());
//! config.package.version = Some("0.0.1".to_string());
//! config.package.maintainer = Some("Irina Shestak <shestak.irina@gmail.com>".to_string());
//! config.package.description = Some("Tiny binaries".to_string());
//!
//! let result = pkg_deb_build::package(config).await?;
//! println!("{:?}", result.artifact);
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod backend;
pub mod context;
pub mod error;
pub mod metadata;
pub mod packager;
pub mod progress;
pub mod staging;
pub mod umask;

pub use artifact::{default_rename, ArtifactPlacer, RenameFn};
pub use backend::{DpkgBackend, PackagingBackend};
pub use context::{BuildContext, PipelineStage};
pub use error::{BuildError, Result};
pub use metadata::{probe_size, ManifestSource, MANIFEST_FILE};
pub use packager::{package, Packager};
pub use progress::{
    reporter_for, IndicatifReporter, LogLevel, ProgressEvent, ProgressReporter, TracingReporter,
};
pub use staging::StagingDir;
pub use umask::{check_umask, read_process_umask, SUPPORTED_UMASKS};
