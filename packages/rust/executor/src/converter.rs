//! The converter seam: anything that can execute one notebook and render it to HTML.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

/// One conversion job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertRequest {
    /// Notebook to execute.
    pub notebook: PathBuf,
    /// Directory the report must be written into.
    pub output_dir: PathBuf,
    /// Report file name, `.html` extension included.
    pub output_name: String,
    /// Time budget for the whole conversion.
    pub timeout: Duration,
}

impl ConvertRequest {
    /// Where a well-behaved converter leaves the report.
    pub fn report_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }
}

/// How a conversion attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertStatus {
    /// The process ran to completion. `None` means it was killed by a signal.
    Exited { code: Option<i32> },
    /// The time budget elapsed and the process was killed.
    TimedOut { after: Duration },
    /// The process could not be started.
    SpawnFailed { message: String },
}

/// Result of one conversion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOutput {
    pub status: ConvertStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

impl ConvertOutput {
    /// Whether the process exited with status zero.
    pub fn exited_cleanly(&self) -> bool {
        matches!(self.status, ConvertStatus::Exited { code: Some(0) })
    }

    /// Human-readable description of a failed attempt, followed by the
    /// converter's own diagnostics when it produced any.
    pub fn failure_summary(&self) -> String {
        let headline = match &self.status {
            ConvertStatus::Exited { code: Some(code) } => {
                format!("converter exited with status {code}")
            }
            ConvertStatus::Exited { code: None } => "converter was terminated by a signal".into(),
            ConvertStatus::TimedOut { after } => {
                format!("converter timed out after {} seconds", after.as_secs_f64())
            }
            ConvertStatus::SpawnFailed { message } => {
                format!("failed to start converter: {message}")
            }
        };

        let diagnostics = if self.stderr.trim().is_empty() {
            self.stdout.trim()
        } else {
            self.stderr.trim()
        };

        if diagnostics.is_empty() {
            headline
        } else {
            format!("{headline}\n\n{}", tail(diagnostics, MAX_DETAIL_BYTES))
        }
    }
}

/// Upper bound on diagnostic text carried into an outcome.
const MAX_DETAIL_BYTES: usize = 16 * 1024;

/// Keep the end of `text`; tracebacks put the useful part last.
fn tail(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

/// Executes a notebook and renders it to an HTML report.
///
/// Implementations never fail: every problem is reported through
/// [`ConvertStatus`] so the batch can carry on.
pub trait Converter {
    fn convert(&self, request: &ConvertRequest) -> impl Future<Output = ConvertOutput> + Send;
}
