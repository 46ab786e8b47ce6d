//! CLI command implementations

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Result};
use pkg_deb_config::{Config, DEFAULT_CONFIG_FILE};
use tracing::debug;

pub mod build;
pub mod init;
pub mod validate;

pub use build::{BuildArgs, BuildCommand};
pub use init::InitCommand;
pub use validate::ValidateCommand;

/// Load the configuration file without validating it
///
/// An explicit `--config` must exist. The default `pkg-deb.yaml` is optional
/// and `None` is returned when it is absent.
fn load_config(explicit: Option<&Path>) -> Result<Option<Config>> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.exists() {
                debug!("No {DEFAULT_CONFIG_FILE} in the current directory");
                return Ok(None);
            }
            default
        }
    };

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(Some(config))
}
