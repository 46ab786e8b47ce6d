//! Pipeline state tracking

use std::fmt;
use std::path::PathBuf;

use pkg_deb_core::BuildResult;
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, Result};

/// Pipeline stage enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Initial state
    Idle,
    /// Loading the manifest and measuring the input
    Resolving,
    /// Laying out the staging tree
    Staging,
    /// Writing the control file
    Rendering,
    /// Running the packaging backend
    Building,
    /// Copying the archive to its destination
    Placing,
    /// Package placed
    Completed,
    /// A stage failed
    Failed,
}

impl PipelineStage {
    /// The stage that normally follows this one
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Resolving),
            Self::Resolving => Some(Self::Staging),
            Self::Staging => Some(Self::Rendering),
            Self::Rendering => Some(Self::Building),
            Self::Building => Some(Self::Placing),
            Self::Placing => Some(Self::Completed),
            Self::Completed | Self::Failed => None,
        }
    }

    /// Check if no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Check if moving to `to` is allowed
    ///
    /// Stages advance one at a time; any running stage may fail.
    pub fn can_transition_to(self, to: Self) -> bool {
        match to {
            Self::Failed => !self.is_terminal(),
            to => self.next() == Some(to),
        }
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            Self::Idle => "Waiting to start",
            Self::Resolving => "Resolving package metadata",
            Self::Staging => "Creating staging directory",
            Self::Rendering => "Writing control file",
            Self::Building => "Building package archive",
            Self::Placing => "Copying package to destination",
            Self::Completed => "Package created",
            Self::Failed => "Packaging failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Staging => "staging",
            Self::Rendering => "rendering",
            Self::Building => "building",
            Self::Placing => "placing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// State of one packaging run
#[derive(Debug, Clone)]
pub struct BuildContext {
    stage: PipelineStage,
    failed_at: Option<PipelineStage>,
    result: BuildResult,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildContext {
    /// Create a new build context
    pub fn new() -> Self {
        Self { stage: PipelineStage::Idle, failed_at: None, result: BuildResult::new("") }
    }

    /// Get current stage
    pub fn stage(&self) -> PipelineStage {
        self.stage
    }

    /// Move to the next stage
    pub fn advance(&mut self, to: PipelineStage) -> Result<()> {
        if !self.stage.can_transition_to(to) {
            return Err(BuildError::InvalidState {
                from: self.stage.to_string(),
                to: to.to_string(),
            });
        }

        if self.stage == PipelineStage::Idle {
            self.result.start();
        }
        self.stage = to;
        Ok(())
    }

    /// Record the package name once it is known
    pub fn set_package_name(&mut self, name: impl Into<String>) {
        self.result.package_name = name.into();
    }

    /// Record backend output
    pub fn set_log(&mut self, log: impl Into<String>) {
        self.result.log = Some(log.into());
    }

    /// Mark the run as completed
    pub fn complete(&mut self, artifact: PathBuf) -> Result<()> {
        self.advance(PipelineStage::Completed)?;
        self.result.succeed(artifact);
        Ok(())
    }

    /// Mark the run as failed; terminal runs are left untouched
    pub fn fail(&mut self, error: impl Into<String>) {
        if !self.stage.is_terminal() {
            self.failed_at = Some(self.stage);
            self.stage = PipelineStage::Failed;
            self.result.fail(error);
        }
    }

    /// The stage that was running when the run failed
    pub fn failed_at(&self) -> Option<PipelineStage> {
        self.failed_at
    }

    /// Get the run report
    pub fn result(&self) -> &BuildResult {
        &self.result
    }

    /// Get build summary
    pub fn summary(&self) -> String {
        match (&self.result.artifact, &self.result.error) {
            (Some(artifact), _) => format!(
                "Created {} in {:.1}s",
                artifact.display(),
                self.result.duration_secs
            ),
            (None, Some(error)) => match self.failed_at {
                Some(stage) => format!("{} failed: {error}", stage.description()),
                None => format!("Failed: {error}"),
            },
            (None, None) => format!("Stage: {}", self.stage),
        }
    }
}
