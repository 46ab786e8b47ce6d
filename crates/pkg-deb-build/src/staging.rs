//! Staging directory management
//!
//! The staging tree is laid out exactly as the installed package:
//!
//! ```text
//! <tmp>/pkg-deb-XXXXXX/<name>_<version>_<arch>/
//! ├── DEBIAN/control
//! ├── DEBIAN/postinst            (optional maintainer scripts)
//! ├── usr/local/bin/<name>       (single-file input)
//! ├── usr/lib/<name>/...         (directory input)
//! └── usr/share/lintian/overrides/<name>
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{BuildError, Result};

/// Prefix of the temporary directory holding the staging tree
pub const STAGING_PREFIX: &str = "pkg-deb-";

/// Maintainer scripts dpkg runs around installation and removal
pub const MAINTAINER_SCRIPTS: &[&str] = &["preinst", "postinst", "prerm", "postrm"];

const DIR_MODE: u32 = 0o755;
const EXECUTABLE_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;

/// An ephemeral package tree, removed when dropped
#[derive(Debug)]
pub struct StagingDir {
    temp_dir: TempDir,
    root: PathBuf,
    token: String,
}

impl StagingDir {
    /// Allocate `<tmp>/pkg-deb-XXXXXX/<token>` under the system temp root
    pub fn create(token: &str) -> Result<Self> {
        let temp_dir = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir()
            .map_err(|e| BuildError::staging(std::env::temp_dir(), e))?;

        Self::create_in(temp_dir, token)
    }

    /// Use an already allocated temporary directory
    pub fn create_in(temp_dir: TempDir, token: &str) -> Result<Self> {
        let root = temp_dir.path().join(token);
        fs::create_dir(&root).map_err(|e| BuildError::staging(&root, e))?;
        set_mode(&root, DIR_MODE)?;

        debug!("Created staging directory {}", root.display());
        Ok(Self { temp_dir, root, token: token.to_string() })
    }

    /// Root of the package tree
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Where the backend writes the built archive
    pub fn artifact_path(&self) -> PathBuf {
        self.temp_dir.path().join(format!("{}.deb", self.token))
    }

    /// Path of the control file inside the tree
    pub fn control_path(&self) -> PathBuf {
        self.root.join("DEBIAN").join("control")
    }

    /// Copy the application into the tree
    ///
    /// A file lands at `<install_dir>/<name>` with mode 0755; a directory is
    /// copied recursively to `usr/lib/<name>/`. Returns the staged path.
    pub fn copy_application(
        &self,
        input: &Path,
        name: &str,
        install_dir: &Path,
    ) -> Result<PathBuf> {
        let metadata = fs::metadata(input).map_err(|e| BuildError::staging(input, e))?;

        if metadata.is_dir() {
            let target = self.ensure_dir(&Path::new("usr").join("lib").join(name))?;
            copy_tree(input, &target, self)?;
            info!("Copied {} to {}", input.display(), target.display());
            Ok(target)
        } else {
            let target_dir = self.ensure_dir(install_dir)?;
            let target = target_dir.join(name);
            fs::copy(input, &target).map_err(|e| BuildError::staging(&target, e))?;
            set_mode(&target, EXECUTABLE_MODE)?;
            info!("Copied {} to {}", input.display(), target.display());
            Ok(target)
        }
    }

    /// Write `DEBIAN/control` with mode 0644
    pub fn write_control(&self, content: &str) -> Result<PathBuf> {
        self.ensure_dir(Path::new("DEBIAN"))?;
        let path = self.control_path();
        fs::write(&path, content).map_err(|e| BuildError::staging(&path, e))?;
        set_mode(&path, FILE_MODE)?;

        debug!("Wrote control file {}", path.display());
        Ok(path)
    }

    /// Copy maintainer scripts into `DEBIAN/` with mode 0755
    pub fn install_scripts(&self, scripts: &BTreeMap<String, PathBuf>) -> Result<Vec<PathBuf>> {
        if let Some(name) = scripts.keys().find(|n| !MAINTAINER_SCRIPTS.contains(&n.as_str())) {
            return Err(BuildError::InvalidScript { name: name.clone() });
        }

        if scripts.is_empty() {
            return Ok(Vec::new());
        }

        let debian_dir = self.ensure_dir(Path::new("DEBIAN"))?;
        let mut installed = Vec::with_capacity(scripts.len());
        for (name, source) in scripts {
            let target = debian_dir.join(name);
            fs::copy(source, &target).map_err(|e| BuildError::staging(source, e))?;
            set_mode(&target, EXECUTABLE_MODE)?;
            debug!("Installed maintainer script {name} from {}", source.display());
            installed.push(target);
        }

        Ok(installed)
    }

    /// Write `usr/share/lintian/overrides/<name>`, one `<name>: <tag>` line
    /// per override
    pub fn write_lintian_overrides(
        &self,
        name: &str,
        overrides: &[String],
    ) -> Result<Option<PathBuf>> {
        if overrides.is_empty() {
            return Ok(None);
        }

        let dir = self.ensure_dir(Path::new("usr/share/lintian/overrides"))?;
        let path = dir.join(name);
        let content: String =
            overrides.iter().map(|tag| format!("{name}: {tag}\n")).collect();
        fs::write(&path, content).map_err(|e| BuildError::staging(&path, e))?;
        set_mode(&path, FILE_MODE)?;

        Ok(Some(path))
    }

    /// Create `relative` and every missing parent inside the tree with mode
    /// 0755
    fn ensure_dir(&self, relative: &Path) -> Result<PathBuf> {
        let mut current = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => current.push(part),
                Component::CurDir => continue,
                _ => {
                    return Err(BuildError::staging(
                        relative,
                        "path must stay inside the package tree",
                    ))
                }
            }

            if !current.is_dir() {
                fs::create_dir(&current).map_err(|e| BuildError::staging(&current, e))?;
                set_mode(&current, DIR_MODE)?;
            }
        }

        Ok(current)
    }
}

fn copy_tree(source: &Path, target: &Path, staging: &StagingDir) -> Result<()> {
    for entry in WalkDir::new(source).min_depth(1) {
        let entry = entry.map_err(|e| BuildError::staging(source, e))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| BuildError::staging(entry.path(), e))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            let inside = destination
                .strip_prefix(staging.path())
                .map_err(|e| BuildError::staging(&destination, e))?;
            staging.ensure_dir(inside)?;
        } else if entry.file_type().is_symlink() {
            let link =
                fs::read_link(entry.path()).map_err(|e| BuildError::staging(entry.path(), e))?;
            std::os::unix::fs::symlink(&link, &destination)
                .map_err(|e| BuildError::staging(&destination, e))?;
        } else {
            fs::copy(entry.path(), &destination)
                .map_err(|e| BuildError::staging(entry.path(), e))?;
        }
    }

    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| BuildError::staging(path, e))
}
