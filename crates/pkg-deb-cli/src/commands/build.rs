//! Build command implementation

use std::path::PathBuf;

use clap::Args;
use color_eyre::eyre::{eyre, Context, Result};
use pkg_deb_build::{read_process_umask, reporter_for, Packager};
use pkg_deb_config::{BackendKind, Config};
use tracing::info;

use super::load_config;

/// Flags of `pkg-deb build`; each one overrides the configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct BuildArgs {
    /// Application binary or directory to package
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory the package is written to
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Application bundle root; the manifest is read from <SRC>/../../package.json
    #[arg(long, value_name = "DIR")]
    pub src: Option<PathBuf>,

    /// Package name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Package version
    #[arg(long, value_name = "VERSION")]
    pub version: Option<String>,

    /// Target architecture (e.g. amd64, arm64)
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Packaging tool
    #[arg(long, value_name = "TOOL")]
    pub backend: Option<BackendKind>,

    /// Run the packaging tool under fakeroot
    #[arg(long)]
    pub fakeroot: bool,

    /// Abort the packaging tool after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl BuildArgs {
    /// Build the run configuration from an optional file and these flags
    pub fn into_config(self, file: Option<Config>) -> Result<Config> {
        let mut config = match file {
            Some(config) => config,
            None => {
                let input = self.input.clone().ok_or_else(|| {
                    eyre!(
                        "No configuration file found; pass --input and --arch or run \
                         `pkg-deb init`"
                    )
                })?;
                Config::new(input, PathBuf::from("./dist"), "")
            }
        };

        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(dest) = self.dest {
            config.dest = dest;
        }
        if let Some(src) = self.src {
            config.src = Some(src);
        }
        if let Some(name) = self.name {
            config.package.name = Some(name);
        }
        if let Some(version) = self.version {
            config.package.version = Some(version);
        }
        if let Some(arch) = self.arch {
            config.package.arch = Some(arch);
        }
        if let Some(kind) = self.backend {
            config.backend.kind = kind;
        }
        if self.fakeroot {
            config.backend.fakeroot = true;
        }
        if let Some(timeout) = self.timeout {
            config.backend.timeout_secs = Some(timeout);
        }

        config.validate().with_context(|| "Invalid configuration")?;
        Ok(config)
    }
}

/// Build command implementation
pub struct BuildCommand {
    config_path: Option<PathBuf>,
    args: BuildArgs,
    interactive: bool,
}

impl BuildCommand {
    pub fn new(config_path: Option<PathBuf>, args: BuildArgs, interactive: bool) -> Self {
        Self { config_path, args, interactive }
    }

    pub async fn execute(&self) -> Result<()> {
        let file = load_config(self.config_path.as_deref())?;
        let config = self.args.clone().into_config(file)?;

        info!("Input: {}", config.input.display());
        info!("Destination: {}", config.dest.display());

        let mut packager = Packager::new(config)
            .with_reporter(reporter_for(self.interactive))
            .with_umask(read_process_umask());

        let result = match packager.run().await {
            Ok(result) => result,
            Err(e) => {
                let stage = packager
                    .context()
                    .failed_at()
                    .map_or("Packaging", |stage| stage.description());
                let hint = if e.is_input_error() {
                    " (check the configuration and package.json)"
                } else {
                    ""
                };
                return Err(e).with_context(|| format!("{stage} failed{hint}"));
            }
        };

        let artifact = result.artifact.ok_or_else(|| eyre!("No package was produced"))?;
        println!("\n✨ Created {}", artifact.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_flags_without_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, b"bin").unwrap();

        let args = BuildArgs {
            input: Some(input.clone()),
            dest: Some(temp_dir.path().join("dist")),
            name: Some("lilbins".to_string()),
            arch: Some("x64".to_string()),
            backend: Some(BackendKind::Dpkg),
            timeout: Some(60),
            ..BuildArgs::default()
        };
        let config = args.into_config(None).unwrap();

        assert_eq!(config.input, input);
        assert_eq!(config.package.arch.as_deref(), Some("x64"));
        assert_eq!(config.backend.kind, BackendKind::Dpkg);
        assert_eq!(config.backend.timeout_secs, Some(60));
        assert!(temp_dir.path().join("dist").is_dir());
    }

    #[test]
    fn test_flags_override_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, b"bin").unwrap();

        let mut file = Config::new(&input, temp_dir.path().join("dist"), "amd64");
        file.package.version = Some("0.0.1".to_string());

        let args = BuildArgs {
            version: Some("0.0.2".to_string()),
            arch: Some("arm64".to_string()),
            fakeroot: true,
            ..BuildArgs::default()
        };
        let config = args.into_config(Some(file)).unwrap();

        assert_eq!(config.input, input);
        assert_eq!(config.package.version.as_deref(), Some("0.0.2"));
        assert_eq!(config.package.arch.as_deref(), Some("arm64"));
        assert!(config.backend.fakeroot);
    }

    #[test]
    fn test_missing_input_and_arch() {
        assert!(BuildArgs::default().into_config(None).is_err());

        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, b"bin").unwrap();
        let args = BuildArgs { input: Some(input), ..BuildArgs::default() };
        assert!(args.into_config(None).is_err());
    }
}
