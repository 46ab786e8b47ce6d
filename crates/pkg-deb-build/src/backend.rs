//! Native packaging backends
//!
//! The backend turns a staged package tree into a `.deb` archive written
//! next to the tree as `<dir>.deb`.

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use pkg_deb_config::{BackendConfig, BackendKind};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{BuildError, Result};

/// Trait for tools that archive a staging tree
#[async_trait]
pub trait PackagingBackend: Send + Sync {
    /// Name used in log lines and error messages
    fn name(&self) -> &str;

    /// Build `<staging_dir>.deb` and return the tool's combined output
    async fn build(&self, staging_dir: &Path) -> Result<String>;
}

/// `dpkg-deb` or `dpkg --build`, optionally under `fakeroot`
#[derive(Debug, Clone)]
pub struct DpkgBackend {
    kind: BackendKind,
    fakeroot: bool,
    timeout: Option<Duration>,
}

impl Default for DpkgBackend {
    fn default() -> Self {
        Self::new(BackendKind::default())
    }
}

impl DpkgBackend {
    /// Create a new backend without wrapper or timeout
    pub fn new(kind: BackendKind) -> Self {
        Self { kind, fakeroot: false, timeout: None }
    }

    /// Create a backend from the `backend` configuration section
    pub fn from_config(config: &BackendConfig) -> Self {
        Self {
            kind: config.kind,
            fakeroot: config.fakeroot,
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Run the tool under `fakeroot`
    pub fn with_fakeroot(mut self, fakeroot: bool) -> Self {
        self.fakeroot = fakeroot;
        self
    }

    /// Kill the tool after `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The program and arguments that build `dir`
    pub fn command_line(&self, dir: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.fakeroot {
            args.push("fakeroot".into());
        }

        args.push(self.kind.program().into());
        if self.kind == BackendKind::DpkgDeb {
            args.push("--root-owner-group".into());
        }
        args.push("--build".into());
        args.push(dir.as_os_str().to_os_string());
        args
    }

    fn program(&self) -> &'static str {
        if self.fakeroot {
            "fakeroot"
        } else {
            self.kind.program()
        }
    }
}

#[async_trait]
impl PackagingBackend for DpkgBackend {
    fn name(&self) -> &str {
        self.kind.program()
    }

    async fn build(&self, staging_dir: &Path) -> Result<String> {
        let program = which::which(self.program()).map_err(|e| {
            BuildError::backend(self.name(), "not started", format!("{}: {e}", self.program()))
        })?;

        let mut command = Command::new(&program);
        command
            .args(self.command_line(staging_dir).into_iter().skip(1))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        info!("Running {} on {}", self.name(), staging_dir.display());
        debug!("Backend command: {:?}", command.as_std());

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output()).await.map_err(|_| {
                BuildError::BackendTimeout {
                    program: self.name().to_string(),
                    duration_secs: limit.as_secs(),
                }
            })?,
            None => command.output().await,
        }
        .map_err(|e| BuildError::backend(self.name(), "not started", e.to_string()))?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(BuildError::backend(self.name(), output.status.to_string(), combined));
        }

        debug!("{} output:\n{}", self.name(), combined.trim_end());
        Ok(combined)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_dpkg_deb_command_line() {
        let backend = DpkgBackend::default();
        let dir = PathBuf::from("/tmp/pkg-deb-x/lilbins_0.0.1_x64");

        assert_eq!(
            strings(backend.command_line(&dir)),
            ["dpkg-deb", "--root-owner-group", "--build", "/tmp/pkg-deb-x/lilbins_0.0.1_x64"]
        );
        assert_eq!(backend.name(), "dpkg-deb");
    }

    #[test]
    fn test_dpkg_under_fakeroot() {
        let backend = DpkgBackend::new(BackendKind::Dpkg).with_fakeroot(true);
        let dir = PathBuf::from("/tmp/tree");

        assert_eq!(
            strings(backend.command_line(&dir)),
            ["fakeroot", "dpkg", "--build", "/tmp/tree"]
        );
        assert_eq!(backend.program(), "fakeroot");
    }

    #[test]
    fn test_from_config() {
        let config =
            BackendConfig { kind: BackendKind::Dpkg, fakeroot: true, timeout_secs: Some(30) };
        let backend = DpkgBackend::from_config(&config);

        assert_eq!(backend.kind, BackendKind::Dpkg);
        assert!(backend.fakeroot);
        assert_eq!(backend.timeout, Some(Duration::from_secs(30)));
    }
}
