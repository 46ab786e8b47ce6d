//! Placement of the built archive

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkg_deb_core::PackageOptions;
use tracing::info;

use crate::error::{BuildError, Result};

/// Maps the destination directory and package options to the final path
pub type RenameFn = Arc<dyn Fn(&Path, &PackageOptions) -> PathBuf + Send + Sync>;

/// `<dest>/<name>_<version>[-<revision>]_<arch>.deb`
pub fn default_rename(dest: &Path, options: &PackageOptions) -> PathBuf {
    let version = match options.revision.as_deref() {
        Some(revision) if !revision.is_empty() => format!("{}-{revision}", options.version),
        _ => options.version.clone(),
    };

    dest.join(format!("{}_{version}_{}.deb", options.name, options.arch))
}

/// Copies the archive out of the staging area
#[derive(Clone)]
pub struct ArtifactPlacer {
    rename: RenameFn,
}

impl fmt::Debug for ArtifactPlacer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactPlacer").finish_non_exhaustive()
    }
}

impl Default for ArtifactPlacer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactPlacer {
    /// Create a new placer using [`default_rename`]
    pub fn new() -> Self {
        Self { rename: Arc::new(default_rename) }
    }

    /// Create a placer with a custom naming function
    pub fn with_rename(rename: RenameFn) -> Self {
        Self { rename }
    }

    /// Final path of the archive for `options`
    pub fn target(&self, dest: &Path, options: &PackageOptions) -> PathBuf {
        (self.rename)(dest, options)
    }

    /// Copy `artifact` to its final path, creating parent directories
    pub async fn place(
        &self,
        artifact: &Path,
        dest: &Path,
        options: &PackageOptions,
    ) -> Result<PathBuf> {
        let target = self.target(dest, options);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BuildError::placement(parent, e))?;
        }

        tokio::fs::copy(artifact, &target)
            .await
            .map_err(|e| BuildError::placement(&target, e))?;

        info!("Placed {}", target.display());
        Ok(target)
    }
}
