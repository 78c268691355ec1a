//! Per-notebook execution.
//!
//! This crate provides:
//! - [`Converter`]: the seam over the external execution/conversion tool
//! - [`NbconvertConverter`]: the `jupyter nbconvert` subprocess implementation
//! - [`execute_document`]: runs one document and turns whatever happened
//!   into an [`Outcome`], always leaving a report file behind

pub mod converter;
pub mod nbconvert;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use nbreport_shared::{Document, NbReportError, Outcome, Result};
use tracing::{info, instrument, warn};

pub use converter::{ConvertOutput, ConvertRequest, ConvertStatus, Converter};
pub use nbconvert::NbconvertConverter;

/// Settings shared by every document in a run.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Root of the report tree.
    pub output_dir: PathBuf,
    /// Time budget per document.
    pub timeout: Duration,
}

/// Execute one document and record its outcome.
///
/// The report lands at `<output_dir>/<relative path>.html`. A converter
/// failure, timeout, or missing report yields a failed [`Outcome`] and a
/// failure page at that location. Only filesystem errors are returned as
/// `Err`.
#[instrument(skip_all, fields(document = %document.display_name()))]
pub async fn execute_document<C: Converter>(
    converter: &C,
    document: &Document,
    opts: &ExecuteOptions,
) -> Result<Outcome> {
    let report_path = opts.output_dir.join(document.report_relative_path());
    let report_dir = report_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| opts.output_dir.clone());
    std::fs::create_dir_all(&report_dir).map_err(|e| NbReportError::io(&report_dir, e))?;

    // A report left by an earlier run must not pass for this run's output.
    match std::fs::remove_file(&report_path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(NbReportError::io(&report_path, e)),
    }

    // nbconvert strips one trailing `.html` from `--output` before appending its own.
    let output_name = report_path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .ok_or_else(|| {
            NbReportError::validation(format!(
                "cannot derive report name for {}",
                document.display_name()
            ))
        })?;

    let request = ConvertRequest {
        notebook: document.path().to_path_buf(),
        output_dir: report_dir,
        output_name,
        timeout: opts.timeout,
    };

    let start = Instant::now();
    let output = converter.convert(&request).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    let failure = if !output.exited_cleanly() {
        Some(output.failure_summary())
    } else if !request.report_path().is_file() {
        Some(format!(
            "converter exited successfully but wrote no report at {}",
            request.report_path().display()
        ))
    } else {
        None
    };

    match failure {
        None => {
            info!(duration_ms, "converted");
            Ok(Outcome::success(document, duration_ms))
        }
        Some(detail) => {
            warn!(duration_ms, detail = %first_line(&detail), "conversion failed");
            nbreport_reporter::write_failure_report(
                &request.report_path(),
                &document.display_name(),
                &detail,
            )?;
            Ok(Outcome::failure(document, detail, duration_ms))
        }
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default()
}
