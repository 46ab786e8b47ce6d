//! Validate command implementation

use std::path::PathBuf;

use color_eyre::eyre::{eyre, Context, Result};
use pkg_deb_build::{default_rename, Packager};
use tracing::info;

use super::load_config;

/// Validate command implementation
pub struct ValidateCommand {
    config_path: Option<PathBuf>,
}

impl ValidateCommand {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        Self { config_path }
    }

    pub async fn execute(&self) -> Result<()> {
        info!("Validating configuration and package metadata");

        let config = load_config(self.config_path.as_deref())?
            .ok_or_else(|| eyre!("No configuration file found; run `pkg-deb init` first"))?;
        config.validate().with_context(|| "Invalid configuration")?;
        println!("✓ Configuration loaded successfully");

        let packager = Packager::new(config);
        let options = packager
            .resolve_options()
            .await
            .with_context(|| "Failed to resolve package metadata")?;
        println!(
            "✓ Package metadata resolved: {} {} ({})",
            options.name, options.version, options.arch
        );

        let control =
            packager.render_control(&options).with_context(|| "Control file is not valid")?;
        println!("✓ Control file is valid\n");
        print!("{control}");

        let target = default_rename(&packager.config().dest, &options);
        println!("\nPackage would be written to {}", target.display());

        Ok(())
    }
}
