//! Report output for nbreport.
//!
//! Renders the index page and per-notebook failure pages, and writes the
//! `manifest.json` run summary into the output directory.

pub mod html;
pub mod manifest;

use std::path::{Path, PathBuf};

use nbreport_shared::{NbReportError, Result, RunResult};
use tracing::{debug, info, instrument};

pub use html::{EMPTY_INDEX, escape, render_failure_page, render_index};
pub use manifest::{ManifestEntry, ManifestMeta, RunManifest, build_manifest, write_manifest};
pub use nbreport_shared::{INDEX_FILE, MANIFEST_FILE};

/// Write `index.html` for the run and return its path.
#[instrument(skip_all, fields(output_dir = %output_dir.display(), outcomes = run.len()))]
pub fn write_index(output_dir: &Path, run: &RunResult) -> Result<PathBuf> {
    let path = output_dir.join(INDEX_FILE);
    write_atomic(&path, render_index(run).as_bytes())?;
    info!(path = %path.display(), "wrote index");
    Ok(path)
}

/// Write a failure page for `source` at `report_path`, creating parent directories.
pub fn write_failure_report(report_path: &Path, source: &str, detail: &str) -> Result<()> {
    if let Some(parent) = report_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| NbReportError::io(parent, e))?;
    }
    let page = render_failure_page(source, detail);
    std::fs::write(report_path, page).map_err(|e| NbReportError::io(report_path, e))?;
    debug!(path = %report_path.display(), "wrote failure report");
    Ok(())
}

/// Write to a temp file beside `path`, then rename over it.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| NbReportError::validation(format!("not a file path: {}", path.display())))?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    std::fs::write(&temp, content).map_err(|e| NbReportError::io(&temp, e))?;
    std::fs::rename(&temp, path).map_err(|e| NbReportError::io(path, e))?;
    Ok(())
}
