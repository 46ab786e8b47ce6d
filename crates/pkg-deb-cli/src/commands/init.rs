//! Init command implementation

use std::path::PathBuf;

use color_eyre::eyre::{Context, Result};
use pkg_deb_config::Config;
use tracing::info;

/// Init command implementation
pub struct InitCommand {
    output_path: PathBuf,
    force: bool,
}

impl InitCommand {
    pub fn new(output_path: PathBuf, force: bool) -> Self {
        Self { output_path, force }
    }

    pub async fn execute(&self) -> Result<()> {
        info!("Initializing configuration file at {}", self.output_path.display());

        if self.output_path.exists() && !self.force {
            return Err(color_eyre::eyre::eyre!(
                "Configuration file already exists: {}. Use --force to overwrite.",
                self.output_path.display()
            ));
        }

        let config = Config::starter("./target/release/my-app");

        let yaml_content =
            serde_yaml::to_string(&config).with_context(|| "Failed to serialize config to YAML")?;

        std::fs::write(&self.output_path, yaml_content)
            .with_context(|| format!("Failed to write config to {}", self.output_path.display()))?;

        println!("✓ Created configuration file: {}", self.output_path.display());
        println!("\nNext steps:");
        println!("1. Point `input` at your built application and fill in the package fields");
        println!(
            "2. Run 'pkg-deb validate -c {}' to check the control file",
            self.output_path.display()
        );
        println!("3. Run 'pkg-deb build -c {}' to build the package", self.output_path.display());

        Ok(())
    }
}
