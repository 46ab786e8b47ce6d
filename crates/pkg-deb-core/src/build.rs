//! Packaging run result tracking

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of packaging one application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    /// Package name
    pub package_name: String,

    /// Build status
    pub status: BuildStatus,

    /// Start time
    pub start_time: DateTime<Utc>,

    /// End time
    pub end_time: DateTime<Utc>,

    /// Duration in seconds
    pub duration_secs: f64,

    /// Final location of the `.deb` file
    pub artifact: Option<PathBuf>,

    /// Output captured from the packaging backend
    pub log: Option<String>,

    /// Error message if failed
    pub error: Option<String>,
}

/// Build status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BuildStatus {
    /// Build succeeded
    Success,

    /// Build failed
    Failed,

    /// Build is in progress
    InProgress,

    /// Build has not started
    Queued,
}

impl BuildResult {
    /// Create a new build result
    pub fn new(package_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            package_name: package_name.into(),
            status: BuildStatus::Queued,
            start_time: now,
            end_time: now,
            duration_secs: 0.0,
            artifact: None,
            log: None,
            error: None,
        }
    }

    /// Mark build as started
    pub fn start(&mut self) {
        self.status = BuildStatus::InProgress;
        self.start_time = Utc::now();
    }

    /// Mark build as completed successfully
    pub fn succeed(&mut self, artifact: PathBuf) {
        self.status = BuildStatus::Success;
        self.finish_clock();
        self.artifact = Some(artifact);
    }

    /// Mark build as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = BuildStatus::Failed;
        self.finish_clock();
        self.error = Some(error.into());
    }

    fn finish_clock(&mut self) {
        self.end_time = Utc::now();
        self.duration_secs = (self.end_time - self.start_time).num_milliseconds() as f64 / 1000.0;
    }
}
