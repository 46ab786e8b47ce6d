//! End-to-end tests for the packaging pipeline using a fake backend

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pkg_deb_build::{
    BuildError, PackagingBackend, Packager, PipelineStage, ProgressEvent, ProgressReporter,
};
use pkg_deb_config::Config;
use pkg_deb_core::{BuildStatus, PackageOptions};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Backend that records the staged tree and writes a dummy archive
#[derive(Default)]
struct FakeBackend {
    control: Mutex<Option<String>>,
    staged: Mutex<Option<PathBuf>>,
    files: Mutex<Vec<String>>,
    fail_with: Option<String>,
    skip_archive: bool,
}

#[async_trait]
impl PackagingBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake-deb"
    }

    async fn build(&self, staging_dir: &Path) -> pkg_deb_build::Result<String> {
        let control = std::fs::read_to_string(staging_dir.join("DEBIAN/control"))?;
        *self.control.lock().unwrap() = Some(control);
        *self.staged.lock().unwrap() = Some(staging_dir.to_path_buf());
        *self.files.lock().unwrap() = WalkDir::new(staging_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                let relative = entry.path().strip_prefix(staging_dir).ok()?;
                Some(relative.to_string_lossy().into_owned())
            })
            .collect();

        if let Some(output) = &self.fail_with {
            return Err(BuildError::backend("fake-deb", "exit status: 2", output.clone()));
        }

        if !self.skip_archive {
            let name = staging_dir.file_name().unwrap_or_default().to_string_lossy();
            std::fs::write(staging_dir.with_file_name(format!("{name}.deb")), b"!<arch>\n")?;
        }
        Ok(format!("building package in '{}'.\n", staging_dir.display()))
    }
}

/// Reporter that keeps every event
#[derive(Default)]
struct CapturingReporter {
    events: Mutex<Vec<ProgressEvent>>,
    finished: Mutex<usize>,
}

impl ProgressReporter for CapturingReporter {
    fn update(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn finish(&self) {
        *self.finished.lock().unwrap() += 1;
    }
}

struct Fixture {
    temp_dir: TempDir,
    config: Config,
}

impl Fixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("lilbins");
        std::fs::write(&input, b"#!/bin/sh\necho lilbins\n").unwrap();

        let mut config = Config::new(&input, temp_dir.path().join("dist"), "x64");
        config.package.name = Some("lilbins".to_string());
        config.package.version = Some("0.0.1".to_string());
        config.package.maintainer = Some("Irina Shestak <shestak.irina@gmail.com>".to_string());
        config.package.description = Some("Tiny binaries".to_string());

        Self { temp_dir, config }
    }

    fn dest(&self) -> PathBuf {
        self.temp_dir.path().join("dist")
    }
}

#[tokio::test]
async fn test_single_file_package() {
    let fixture = Fixture::new();
    let backend = Arc::new(FakeBackend::default());

    let mut packager = Packager::new(fixture.config.clone()).with_backend(backend.clone());
    let result = packager.run().await.unwrap();

    let expected = fixture.dest().join("lilbins_0.0.1_x64.deb");
    assert_eq!(result.status, BuildStatus::Success);
    assert_eq!(result.package_name, "lilbins");
    assert_eq!(result.artifact.as_deref(), Some(expected.as_path()));
    assert!(expected.is_file());
    assert!(result.log.unwrap().contains("building package"));
    assert_eq!(packager.context().stage(), PipelineStage::Completed);

    let control = backend.control.lock().unwrap().clone().unwrap();
    assert!(control.contains("Package: lilbins\n"));
    assert!(control.contains("Version: 0.0.1\n"));
    assert!(control.contains("Architecture: x64\n"));
    assert!(control.contains("Installed-Size: 1\n"));
}

#[tokio::test]
async fn test_staging_tree_layout_and_cleanup() {
    let mut fixture = Fixture::new();
    let script = fixture.temp_dir.path().join("postinst");
    std::fs::write(&script, b"#!/bin/sh\nexit 0\n").unwrap();
    fixture.config.scripts.insert("postinst".to_string(), script);
    fixture.config.package.lintian_overrides = vec!["binary-without-manpage".to_string()];

    let backend = Arc::new(FakeBackend::default());
    let mut packager = Packager::new(fixture.config.clone()).with_backend(backend.clone());

    packager.run().await.unwrap();

    assert_eq!(
        *backend.files.lock().unwrap(),
        [
            "DEBIAN/control",
            "DEBIAN/postinst",
            "usr/local/bin/lilbins",
            "usr/share/lintian/overrides/lilbins",
        ]
    );

    let staged = backend.staged.lock().unwrap().clone().unwrap();
    assert_eq!(staged.file_name().unwrap(), "lilbins_0.0.1_x64");
    assert!(!staged.exists(), "staging tree should be removed after the run");
}

#[tokio::test]
async fn test_custom_rename() {
    let fixture = Fixture::new();
    let mut packager = Packager::new(fixture.config.clone())
        .with_backend(Arc::new(FakeBackend::default()))
        .with_rename(Arc::new(|dest: &Path, options: &PackageOptions| {
            dest.join("custom").join(format!("{}-latest.deb", options.name))
        }));

    let result = packager.run().await.unwrap();

    let expected = fixture.dest().join("custom").join("lilbins-latest.deb");
    assert_eq!(result.artifact, Some(expected.clone()));
    assert!(expected.is_file());
}

#[tokio::test]
async fn test_backend_failure_relays_output() {
    let fixture = Fixture::new();
    let backend = FakeBackend {
        fail_with: Some("dpkg-deb: error: parsing file 'DEBIAN/control'".to_string()),
        ..FakeBackend::default()
    };

    let mut packager = Packager::new(fixture.config.clone()).with_backend(Arc::new(backend));
    let err = packager.run().await.unwrap_err();

    assert!(matches!(err, BuildError::Backend { .. }));
    assert!(err.to_string().contains("parsing file 'DEBIAN/control'"));
    assert_eq!(packager.context().stage(), PipelineStage::Failed);
    assert_eq!(packager.context().failed_at(), Some(PipelineStage::Building));
    assert_eq!(packager.context().result().status, BuildStatus::Failed);
    assert!(!fixture.dest().join("lilbins_0.0.1_x64.deb").exists());
}

#[tokio::test]
async fn test_missing_archive() {
    let fixture = Fixture::new();
    let backend = FakeBackend { skip_archive: true, ..FakeBackend::default() };

    let mut packager = Packager::new(fixture.config.clone()).with_backend(Arc::new(backend));
    let err = packager.run().await.unwrap_err();

    match err {
        BuildError::ArtifactMissing { path } => {
            assert_eq!(path.file_name().unwrap(), "lilbins_0.0.1_x64.deb");
        }
        other => panic!("Expected ArtifactMissing, got {other:?}"),
    }
}

#[tokio::test]
async fn test_manifest_metadata() {
    let mut fixture = Fixture::new();
    let bundle = fixture.temp_dir.path().join("app").join("dist").join("linux-unpacked");
    std::fs::create_dir_all(&bundle).unwrap();
    std::fs::write(
        fixture.temp_dir.path().join("app").join("package.json"),
        r#"{
            "name": "@nori/cat-pkg",
            "version": "1.2.3-beta1",
            "description": "pkg for Nori-cat.",
            "author": "Irina Shestak <shestak.irina@gmail.com> (nom.lrlna.computer)"
        }"#,
    )
    .unwrap();

    fixture.config.src = Some(bundle);
    fixture.config.package.name = None;
    fixture.config.package.version = None;
    fixture.config.package.maintainer = None;
    fixture.config.package.description = None;

    let backend = Arc::new(FakeBackend::default());
    let mut packager = Packager::new(fixture.config.clone()).with_backend(backend.clone());
    let result = packager.run().await.unwrap();

    assert_eq!(result.package_name, "nori-cat-pkg");
    assert!(fixture.dest().join("nori-cat-pkg_1.2.3~beta1_x64.deb").is_file());

    let control = backend.control.lock().unwrap().clone().unwrap();
    assert!(control.contains("Maintainer: Irina Shestak <shestak.irina@gmail.com>\n"));
    assert!(control.contains("Description: pkg for Nori-cat.\n"));
}

#[tokio::test]
async fn test_missing_manifest_reports_path() {
    let mut fixture = Fixture::new();
    let manifest = fixture.temp_dir.path().join("nowhere").join("package.json");
    fixture.config.manifest = Some(manifest.clone());

    let mut packager =
        Packager::new(fixture.config.clone()).with_backend(Arc::new(FakeBackend::default()));
    let err = packager.run().await.unwrap_err();

    match err {
        BuildError::Manifest { path, .. } => assert_eq!(path, manifest),
        other => panic!("Expected Manifest error, got {other:?}"),
    }
    assert_eq!(packager.context().failed_at(), Some(PipelineStage::Resolving));
}

#[tokio::test]
async fn test_missing_description_fails_before_staging() {
    let mut fixture = Fixture::new();
    fixture.config.package.description = None;

    let backend = Arc::new(FakeBackend::default());
    let mut packager = Packager::new(fixture.config.clone()).with_backend(backend.clone());
    let err = packager.run().await.unwrap_err();

    assert!(err.is_input_error());
    assert!(backend.staged.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_unsupported_umask_warns_and_continues() {
    let fixture = Fixture::new();
    let reporter = Arc::new(CapturingReporter::default());

    let mut packager = Packager::new(fixture.config.clone())
        .with_backend(Arc::new(FakeBackend::default()))
        .with_reporter(reporter.clone())
        .with_umask(0o077);
    let result = packager.run().await.unwrap();

    assert_eq!(result.status, BuildStatus::Success);

    let events = reporter.events.lock().unwrap();
    assert_eq!(
        events.first(),
        Some(&ProgressEvent::warn(
            "The current umask, 0077, is not supported. You should use 0022 or 0002"
        ))
    );

    let stages: Vec<PipelineStage> = events
        .iter()
        .filter_map(|e| match e {
            ProgressEvent::Stage { stage, .. } => Some(*stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        [
            PipelineStage::Resolving,
            PipelineStage::Staging,
            PipelineStage::Rendering,
            PipelineStage::Building,
            PipelineStage::Placing,
        ]
    );
    assert!(matches!(events.last(), Some(ProgressEvent::Finished { success: true, .. })));
    assert_eq!(*reporter.finished.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_supported_umask_is_silent() {
    let fixture = Fixture::new();
    let reporter = Arc::new(CapturingReporter::default());

    let mut packager = Packager::new(fixture.config.clone())
        .with_backend(Arc::new(FakeBackend::default()))
        .with_reporter(reporter.clone())
        .with_umask(0o022);
    packager.run().await.unwrap();

    let events = reporter.events.lock().unwrap();
    assert!(!events.iter().any(|e| matches!(e, ProgressEvent::Log { .. })));
}

#[tokio::test]
async fn test_packager_runs_once() {
    let fixture = Fixture::new();
    let mut packager =
        Packager::new(fixture.config.clone()).with_backend(Arc::new(FakeBackend::default()));

    packager.run().await.unwrap();
    let err = packager.run().await.unwrap_err();

    assert!(matches!(err, BuildError::InvalidState { .. }));
    assert_eq!(packager.context().stage(), PipelineStage::Completed);
}
