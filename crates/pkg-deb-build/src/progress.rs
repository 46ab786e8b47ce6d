//! Progress reporting for the packaging pipeline
//!
//! Every pipeline event goes to a [`ProgressReporter`]. The CLI shows an
//! indicatif spinner on a terminal; library callers get tracing output.

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info, warn};

use crate::context::PipelineStage;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// Event emitted while packaging
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// A pipeline stage started
    Stage { stage: PipelineStage, message: String },
    /// Free-form message
    Log { level: LogLevel, message: String },
    /// The run ended
    Finished { success: bool, message: String },
}

impl ProgressEvent {
    /// Create a stage event using the stage's description
    pub fn stage(stage: PipelineStage) -> Self {
        Self::Stage { stage, message: stage.description().to_string() }
    }

    /// Create a warning event
    pub fn warn(message: impl Into<String>) -> Self {
        Self::Log { level: LogLevel::Warn, message: message.into() }
    }
}

/// Trait for progress sinks
pub trait ProgressReporter: Send + Sync {
    /// Handle an event
    fn update(&self, event: &ProgressEvent);

    /// Tear down any display
    fn finish(&self);
}

/// Reporter that forwards events to tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ProgressReporter for TracingReporter {
    fn update(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Stage { stage, message } => info!("[{stage}] {message}"),
            ProgressEvent::Log { level, message } => log(*level, message),
            ProgressEvent::Finished { success: true, message } => info!("{message}"),
            ProgressEvent::Finished { success: false, message } => error!("{message}"),
        }
    }

    fn finish(&self) {
        debug!("Packaging finished");
    }
}

/// Spinner showing the current stage
pub struct IndicatifReporter {
    spinner: ProgressBar,
    start_time: Instant,
}

impl IndicatifReporter {
    /// Create a new spinner on stderr
    pub fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{prefix:.bold.dim} {spinner:.green} {wide_msg}")
                .expect("Valid template"),
        );
        spinner.set_prefix("pkg-deb");
        spinner.enable_steady_tick(Duration::from_millis(100));

        Self { spinner, start_time: Instant::now() }
    }
}

impl Default for IndicatifReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for IndicatifReporter {
    fn update(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Stage { stage, message } => {
                debug!("[{stage}] {message}");
                self.spinner.set_message(format!("{message}..."));
            }
            ProgressEvent::Log { level, message } => {
                log(*level, message);
                match level {
                    LogLevel::Warn => self.spinner.println(format!("WARN: {message}")),
                    LogLevel::Error => self.spinner.println(format!("ERROR: {message}")),
                    LogLevel::Info | LogLevel::Debug => {}
                }
            }
            ProgressEvent::Finished { success, message } => {
                let elapsed = self.start_time.elapsed();
                if *success {
                    self.spinner.finish_with_message(format!("✓ {message} ({elapsed:.1?})"));
                } else {
                    self.spinner.abandon_with_message(format!("✗ {message}"));
                }
            }
        }
    }

    fn finish(&self) {
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

fn log(level: LogLevel, message: &str) {
    match level {
        LogLevel::Error => error!("{}", message),
        LogLevel::Warn => warn!("{}", message),
        LogLevel::Info => info!("{}", message),
        LogLevel::Debug => debug!("{}", message),
    }
}

/// Pick a reporter for the current environment
///
/// The spinner is only used when requested and stderr is a terminal.
pub fn reporter_for(interactive: bool) -> Arc<dyn ProgressReporter> {
    if interactive && std::io::stderr().is_terminal() {
        Arc::new(IndicatifReporter::new())
    } else {
        Arc::new(TracingReporter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_event_uses_description() {
        assert_eq!(
            ProgressEvent::stage(PipelineStage::Building),
            ProgressEvent::Stage {
                stage: PipelineStage::Building,
                message: "Building package archive".to_string(),
            }
        );
    }

    #[test]
    fn test_tracing_reporter_handles_all_events() {
        let reporter = TracingReporter;
        reporter.update(&ProgressEvent::stage(PipelineStage::Resolving));
        reporter.update(&ProgressEvent::warn("umask"));
        reporter.update(&ProgressEvent::Finished { success: false, message: "boom".to_string() });
        reporter.finish();
    }

    #[test]
    fn test_indicatif_reporter() {
        let reporter = IndicatifReporter::new();
        reporter.update(&ProgressEvent::stage(PipelineStage::Staging));
        reporter.update(&ProgressEvent::Log {
            level: LogLevel::Info,
            message: "Copied input".to_string(),
        });
        reporter.update(&ProgressEvent::Finished { success: true, message: "done".to_string() });
        reporter.finish();
    }

    #[test]
    fn test_non_interactive_reporter() {
        let reporter = reporter_for(false);
        let shared = Arc::clone(&reporter);
        shared.update(&ProgressEvent::stage(PipelineStage::Placing));
        reporter.finish();
        assert_eq!(Arc::strong_count(&reporter), 2);
    }
}
