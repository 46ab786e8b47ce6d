//! Manifest resolution and input size probing

use std::path::{Path, PathBuf};

use pkg_deb_config::Config;
use pkg_deb_core::PackageManifest;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// File name of the application manifest
pub const MANIFEST_FILE: &str = "package.json";

/// Where the application manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Two directory levels above the application bundle root
    Conventional(PathBuf),
    /// A specific file
    Explicit(PathBuf),
    /// No manifest; all metadata comes from the caller
    None,
}

impl ManifestSource {
    /// Pick the source configured for a run; an explicit manifest wins over
    /// `src`
    pub fn from_config(config: &Config) -> Self {
        match (&config.manifest, &config.src) {
            (Some(path), _) => Self::Explicit(path.clone()),
            (None, Some(src)) => Self::Conventional(src.clone()),
            (None, None) => Self::None,
        }
    }

    /// The file that will be read, if any
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::Conventional(bundle_root) => {
                Some(bundle_root.join("..").join("..").join(MANIFEST_FILE))
            }
            Self::Explicit(path) => Some(path.clone()),
            Self::None => None,
        }
    }

    /// Load and parse the manifest
    ///
    /// A configured but unreadable or malformed manifest is an error naming
    /// the attempted path.
    pub async fn resolve(&self) -> Result<PackageManifest> {
        let Some(path) = self.path() else {
            debug!("No manifest configured, using caller metadata only");
            return Ok(PackageManifest::default());
        };

        info!("Reading manifest from {}", path.display());
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| BuildError::manifest(&path, e))?;

        PackageManifest::from_json(&content).map_err(|e| BuildError::manifest(&path, e))
    }
}

/// Total size in bytes of the regular files under `path`
///
/// A single file yields its own length. Symbolic links are not followed.
pub fn content_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(path) {
        let entry = entry.map_err(std::io::Error::from)?;
        if entry.file_type().is_file() {
            total += entry.metadata().map_err(std::io::Error::from)?.len();
        }
    }
    Ok(total)
}

/// Measure the input on the blocking pool
///
/// Never fails: an unmeasurable input reports zero bytes with a warning so
/// that the control file still gets an `Installed-Size`.
pub async fn probe_size(path: PathBuf) -> Result<u64> {
    let probe_path = path.clone();
    let measured = tokio::task::spawn_blocking(move || content_size(&probe_path)).await;

    match measured {
        Ok(Ok(bytes)) => {
            debug!("Input {} is {bytes} bytes", path.display());
            Ok(bytes)
        }
        Ok(Err(e)) => {
            warn!("Failed to measure {}: {e}; reporting size 0", path.display());
            Ok(0)
        }
        Err(e) => {
            warn!("Size probe for {} did not complete: {e}; reporting size 0", path.display());
            Ok(0)
        }
    }
}
