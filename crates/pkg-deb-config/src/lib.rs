//! Configuration management for pkg-deb
//!
//! This crate handles YAML configuration parsing, validation,
//! and environment variable substitution.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use pkg_deb_core::error::{Error, Result};
use once_cell::sync::Lazy;
use pkg_deb_core::PackageOverrides;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "pkg-deb.yaml";

/// `${VAR}` or `$VAR` inside a path field
static ENV_VAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]+)\}|\$([A-Za-z_][A-Za-z0-9_]*)").expect("Invalid regex")
});

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application binary or directory to package
    pub input: PathBuf,

    /// Directory that receives the built `.deb`
    #[serde(default = "default_dest")]
    pub dest: PathBuf,

    /// Application bundle root; the manifest is looked up two levels above it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<PathBuf>,

    /// Explicit manifest path, takes precedence over `src`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    /// Package metadata overriding the manifest
    #[serde(flatten)]
    pub package: PackageOverrides,

    /// Install location of a single-file input, relative to the package root
    #[serde(default = "default_install_dir")]
    pub install_dir: PathBuf,

    /// Maintainer scripts keyed by name (`preinst`, `postinst`, `prerm`, `postrm`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, PathBuf>,

    /// Custom control file template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_template: Option<PathBuf>,

    /// Packaging backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Packaging backend configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BackendConfig {
    /// Which tool builds the archive
    pub kind: BackendKind,

    /// Run the backend under `fakeroot`
    pub fakeroot: bool,

    /// Abort the backend after this many seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

/// Native packaging tool
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    /// `dpkg-deb --build`
    #[default]
    DpkgDeb,

    /// `dpkg --build`
    Dpkg,
}

impl BackendKind {
    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            Self::DpkgDeb => "dpkg-deb",
            Self::Dpkg => "dpkg",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "dpkg-deb" => Ok(Self::DpkgDeb),
            "dpkg" => Ok(Self::Dpkg),
            other => Err(Error::config(format!(
                "Unknown backend {other:?}, expected `dpkg-deb` or `dpkg`"
            ))),
        }
    }
}

impl Config {
    /// Create a configuration for packaging `input` into `dest`
    pub fn new(
        input: impl Into<PathBuf>,
        dest: impl Into<PathBuf>,
        arch: impl Into<String>,
    ) -> Self {
        Self {
            input: input.into(),
            dest: dest.into(),
            src: None,
            manifest: None,
            package: PackageOverrides { arch: Some(arch.into()), ..Default::default() },
            install_dir: default_install_dir(),
            scripts: BTreeMap::new(),
            control_template: None,
            backend: BackendConfig::default(),
        }
    }

    /// Load, expand and validate a YAML configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and expand a YAML configuration file without validating it
    ///
    /// Callers that layer command line overrides on top should validate
    /// afterwards.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::ConfigError {
            message: format!("Failed to read config file {path:?}: {e}"),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse YAML text and expand environment variables in path fields
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError { message: format!("Failed to parse YAML: {e}") })?;

        config.expand_env_vars()?;

        Ok(config)
    }

    /// Expand environment variables in paths
    fn expand_env_vars(&mut self) -> Result<()> {
        self.input = expand_path(&self.input)?;
        self.dest = expand_path(&self.dest)?;

        for path in [&mut self.src, &mut self.manifest, &mut self.control_template]
            .into_iter()
            .flatten()
        {
            *path = expand_path(path)?;
        }

        for script in self.scripts.values_mut() {
            *script = expand_path(script)?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.input.exists() {
            return Err(Error::config(format!("Input does not exist: {:?}", self.input)));
        }

        if self.package.arch.as_deref().map_or(true, |a| a.trim().is_empty()) {
            return Err(Error::config("No target architecture configured (set `arch`)"));
        }

        let escapes_root = self
            .install_dir
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(Error::config(format!(
                "install_dir must be a relative path inside the package: {:?}",
                self.install_dir
            )));
        }

        if self.backend.timeout_secs == Some(0) {
            return Err(Error::config("backend.timeout_secs must be at least 1"));
        }

        if let Some(template) = &self.control_template {
            if !template.is_file() {
                return Err(Error::config(format!(
                    "Control template does not exist: {template:?}"
                )));
            }
        }

        // Create dest if it doesn't exist
        if !self.dest.exists() {
            std::fs::create_dir_all(&self.dest).map_err(|e| Error::ConfigError {
                message: format!("Failed to create dest {:?}: {e}", self.dest),
            })?;
        }

        Ok(())
    }

    /// Starter configuration written by `pkg-deb init`
    pub fn starter(input: impl Into<PathBuf>) -> Self {
        let mut config = Self::new(input, default_dest(), "amd64");
        config.package.name = Some("my-app".to_string());
        config.package.version = Some("0.1.0".to_string());
        config.package.maintainer = Some("Your Name <you@example.com>".to_string());
        config.package.description = Some("Short description of my-app".to_string());
        config.package.depends = vec!["libc6".to_string()];
        config
    }
}

/// Expand environment variables in a path
fn expand_path(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_string_lossy();

    let mut result = path_str.to_string();
    for cap in ENV_VAR_RE.captures_iter(&path_str) {
        let Some(var_name) = cap.get(1).or_else(|| cap.get(2)).map(|m| m.as_str()) else {
            continue;
        };
        let var_value = std::env::var(var_name).map_err(|_| Error::ConfigError {
            message: format!("Environment variable not found: {var_name}"),
        })?;

        result = result.replace(&cap[0], &var_value);
    }

    Ok(PathBuf::from(result))
}

fn default_dest() -> PathBuf {
    PathBuf::from("./dist")
}

fn default_install_dir() -> PathBuf {
    PathBuf::from("usr/local/bin")
}

#[cfg(test)]
mod tests {
    use std::env;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_expand_path() {
        env::set_var("PKG_DEB_TEST_VAR", "/test/path");

        let path = PathBuf::from("${PKG_DEB_TEST_VAR}/sub");
        let expanded = expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/path/sub"));

        let path = PathBuf::from("$PKG_DEB_TEST_VAR/sub");
        let expanded = expand_path(&path).unwrap();
        assert_eq!(expanded, PathBuf::from("/test/path/sub"));

        assert!(expand_path(Path::new("$PKG_DEB_SURELY_UNSET_VAR/x")).is_err());
    }

    #[test]
    fn test_parse_yaml() {
        env::set_var("PKG_DEB_TEST_OUT", "/tmp/out");

        let config = Config::from_yaml(
            r#"
input: ./build/lilbins
dest: ${PKG_DEB_TEST_OUT}/debs
name: lilbins
version: 0.0.1
arch: x64
depends:
  - libc6
scripts:
  postinst: ./scripts/postinst
backend:
  kind: dpkg
  fakeroot: true
  timeout_secs: 60
"#,
        )
        .unwrap();

        assert_eq!(config.input, PathBuf::from("./build/lilbins"));
        assert_eq!(config.dest, PathBuf::from("/tmp/out/debs"));
        assert_eq!(config.package.name.as_deref(), Some("lilbins"));
        assert_eq!(config.package.arch.as_deref(), Some("x64"));
        assert_eq!(config.package.depends, vec!["libc6".to_string()]);
        assert_eq!(config.install_dir, PathBuf::from("usr/local/bin"));
        assert_eq!(config.scripts.get("postinst"), Some(&PathBuf::from("./scripts/postinst")));
        assert_eq!(
            config.backend,
            BackendConfig { kind: BackendKind::Dpkg, fakeroot: true, timeout_secs: Some(60) }
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("input: app\narch: amd64\n").unwrap();

        assert_eq!(config.dest, PathBuf::from("./dist"));
        assert_eq!(config.backend.kind, BackendKind::DpkgDeb);
        assert!(!config.backend.fakeroot);
        assert!(config.src.is_none());
        assert!(config.manifest.is_none());
    }

    #[test]
    fn test_numeric_version_and_revision() {
        let config = Config::from_yaml("input: app\narch: amd64\nrevision: 1\n").unwrap();
        assert_eq!(config.package.revision.as_deref(), Some("1"));

        let config = Config::from_yaml("input: app\narch: amd64\nversion: 2.0\n").unwrap();
        assert_eq!(config.package.version.as_deref(), Some("2.0"));

        let config = Config::from_yaml("input: app\narch: amd64\nversion: \"1.10\"\n").unwrap();
        assert_eq!(config.package.version.as_deref(), Some("1.10"));
    }

    #[test]
    fn test_expand_path_multiple_variables() {
        env::set_var("PKG_DEB_TEST_ROOT", "/srv");
        env::set_var("PKG_DEB_TEST_APP", "lilbins");

        let expanded =
            expand_path(Path::new("${PKG_DEB_TEST_ROOT}/apps/$PKG_DEB_TEST_APP/bin")).unwrap();
        assert_eq!(expanded, PathBuf::from("/srv/apps/lilbins/bin"));
    }

    #[test]
    fn test_config_validation() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, "#!/bin/sh\necho hi\n").unwrap();

        let config = Config::new(&input, temp_dir.path().join("dist"), "x64");

        // Should create the missing dest directory
        assert!(config.validate().is_ok());
        assert!(temp_dir.path().join("dist").is_dir());
    }

    #[test]
    fn test_validation_failures() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, "bin").unwrap();
        let dest = temp_dir.path().join("dist");

        let missing_input = Config::new(temp_dir.path().join("nope"), &dest, "x64");
        assert!(missing_input.validate().is_err());

        let no_arch = Config::new(&input, &dest, " ");
        assert!(no_arch.validate().is_err());

        let mut absolute_install = Config::new(&input, &dest, "x64");
        absolute_install.install_dir = PathBuf::from("/usr/bin");
        assert!(absolute_install.validate().is_err());

        let mut escaping_install = Config::new(&input, &dest, "x64");
        escaping_install.install_dir = PathBuf::from("usr/../../etc");
        assert!(escaping_install.validate().is_err());

        let mut zero_timeout = Config::new(&input, &dest, "x64");
        zero_timeout.backend.timeout_secs = Some(0);
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_backend_kind_parsing() {
        assert_eq!("dpkg-deb".parse::<BackendKind>().unwrap(), BackendKind::DpkgDeb);
        assert_eq!("dpkg".parse::<BackendKind>().unwrap(), BackendKind::Dpkg);
        assert!("rpmbuild".parse::<BackendKind>().is_err());
        assert_eq!(BackendKind::DpkgDeb.to_string(), "dpkg-deb");
    }

    #[test]
    fn test_starter_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::starter("./build/my-app")).unwrap();
        let parsed = Config::from_yaml(&yaml).unwrap();

        assert_eq!(parsed.package.name.as_deref(), Some("my-app"));
        assert_eq!(parsed.package.arch.as_deref(), Some("amd64"));
        assert_eq!(parsed.input, PathBuf::from("./build/my-app"));
    }
}
