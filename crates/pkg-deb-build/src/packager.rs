//! The packaging pipeline
//!
//! A [`Packager`] runs one package build through
//! resolve, stage, render, build and place. Stages run strictly in order and
//! the first failure aborts the run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use pkg_deb_config::Config;
use pkg_deb_core::{BuildResult, PackageOptions};
use pkg_deb_debian::{ControlRenderer, ControlValidator, OptionsNormalizer};
use tracing::{debug, info};

use crate::artifact::{ArtifactPlacer, RenameFn};
use crate::backend::{DpkgBackend, PackagingBackend};
use crate::context::{BuildContext, PipelineStage};
use crate::error::{BuildError, Result};
use crate::metadata::{probe_size, ManifestSource};
use crate::progress::{ProgressEvent, ProgressReporter, TracingReporter};
use crate::staging::StagingDir;
use crate::umask::{check_umask, read_process_umask};

/// Package one application with the current process umask
pub async fn package(config: Config) -> Result<BuildResult> {
    Packager::new(config).with_umask(read_process_umask()).run().await
}

/// Drives a single package build
pub struct Packager {
    config: Config,
    backend: Arc<dyn PackagingBackend>,
    reporter: Arc<dyn ProgressReporter>,
    placer: ArtifactPlacer,
    normalizer: OptionsNormalizer,
    validator: ControlValidator,
    umask: Option<u32>,
    context: BuildContext,
}

impl Packager {
    /// Create a new packager using the configured dpkg backend
    pub fn new(config: Config) -> Self {
        let backend = Arc::new(DpkgBackend::from_config(&config.backend));

        Self {
            config,
            backend,
            reporter: Arc::new(TracingReporter),
            placer: ArtifactPlacer::new(),
            normalizer: OptionsNormalizer::new(),
            validator: ControlValidator::default(),
            umask: None,
            context: BuildContext::new(),
        }
    }

    /// Replace the packaging backend
    pub fn with_backend(mut self, backend: Arc<dyn PackagingBackend>) -> Self {
        self.backend = backend;
        self
    }

    /// Replace the progress sink
    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the artifact naming function
    pub fn with_rename(mut self, rename: RenameFn) -> Self {
        self.placer = ArtifactPlacer::with_rename(rename);
        self
    }

    /// Check this umask before running
    pub fn with_umask(mut self, umask: u32) -> Self {
        self.umask = Some(umask);
        self
    }

    /// The configuration of this run
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Pipeline state
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Resolve the manifest, measure the input and normalize the options
    ///
    /// Manifest loading and the size probe run concurrently.
    pub async fn resolve_options(&self) -> Result<PackageOptions> {
        let source = ManifestSource::from_config(&self.config);
        let (manifest, size) =
            tokio::try_join!(source.resolve(), probe_size(self.config.input.clone()))?;

        Ok(self.normalizer.normalize(&manifest, &self.config.package, size)?)
    }

    /// Render and validate the control stanza for `options`
    pub fn render_control(&self, options: &PackageOptions) -> Result<String> {
        let renderer = match &self.config.control_template {
            Some(path) => ControlRenderer::from_file(path)?,
            None => ControlRenderer::new(),
        };

        let control = renderer.render(options)?;
        let report = self.validator.ensure_valid(&control, &options.name)?;
        for warning in report.warnings {
            self.reporter.update(&ProgressEvent::warn(warning));
        }

        Ok(control)
    }

    /// Run every stage and return the report
    ///
    /// An unsupported umask is reported as a warning; the run continues.
    pub async fn run(&mut self) -> Result<BuildResult> {
        if let Some(warning) = self.umask.and_then(check_umask) {
            self.reporter.update(&ProgressEvent::warn(warning));
        }

        let outcome = match self.execute().await {
            Ok(artifact) => self.context.complete(artifact),
            Err(e) => Err(e),
        };

        if let Err(e) = outcome {
            self.context.fail(e.to_string());
            self.finish(false);
            return Err(e);
        }

        self.finish(true);
        Ok(self.context.result().clone())
    }

    async fn execute(&mut self) -> Result<PathBuf> {
        let options = self.generate_defaults().await?;
        let staging = self.create_staging_dir(&options)?;
        self.copy_application(&staging, &options)?;
        self.create_control(&staging, &options)?;
        let artifact = self.create_package(&staging).await?;
        self.write_package(&artifact, &options).await
    }

    async fn generate_defaults(&mut self) -> Result<PackageOptions> {
        self.enter(PipelineStage::Resolving)?;

        let options = self.resolve_options().await?;
        self.context.set_package_name(&options.name);
        info!("Packaging {} {} for {}", options.name, options.version, options.arch);
        Ok(options)
    }

    fn create_staging_dir(&mut self, options: &PackageOptions) -> Result<StagingDir> {
        self.enter(PipelineStage::Staging)?;
        StagingDir::create(&options.package_token())
    }

    fn copy_application(&self, staging: &StagingDir, options: &PackageOptions) -> Result<()> {
        let target =
            staging.copy_application(&self.config.input, &options.name, &self.config.install_dir)?;
        debug!("Application staged at {}", target.display());

        let scripts = staging.install_scripts(&self.config.scripts)?;
        if !scripts.is_empty() {
            debug!("Installed {} maintainer scripts", scripts.len());
        }

        staging.write_lintian_overrides(&options.name, &options.lintian_overrides)?;
        Ok(())
    }

    fn create_control(&mut self, staging: &StagingDir, options: &PackageOptions) -> Result<()> {
        self.enter(PipelineStage::Rendering)?;

        let control = self.render_control(options)?;
        staging.write_control(&control)?;
        Ok(())
    }

    async fn create_package(&mut self, staging: &StagingDir) -> Result<PathBuf> {
        self.enter(PipelineStage::Building)?;

        let log = self.backend.build(staging.path()).await?;
        self.context.set_log(log);

        let artifact = staging.artifact_path();
        if !artifact.is_file() {
            return Err(BuildError::ArtifactMissing { path: artifact });
        }
        Ok(artifact)
    }

    async fn write_package(
        &mut self,
        artifact: &Path,
        options: &PackageOptions,
    ) -> Result<PathBuf> {
        self.enter(PipelineStage::Placing)?;
        self.placer.place(artifact, &self.config.dest, options).await
    }

    fn enter(&mut self, stage: PipelineStage) -> Result<()> {
        self.context.advance(stage)?;
        self.reporter.update(&ProgressEvent::stage(stage));
        Ok(())
    }

    fn finish(&self, success: bool) {
        self.reporter.update(&ProgressEvent::Finished { success, message: self.context.summary() });
        self.reporter.finish();
    }
}
