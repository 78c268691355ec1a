//! End-to-end build pipeline: root → discovery → execute each notebook → index + manifest.

use std::path::PathBuf;
use std::time::Instant;

use chrono::Utc;
use tracing::{info, instrument};

use nbreport_discovery::DiscoveryOptions;
use nbreport_executor::{Converter, ExecuteOptions};
use nbreport_reporter::ManifestMeta;
use nbreport_shared::{Document, NbReportError, Outcome, Result, RunConfig, RunResult};

/// Version recorded in `manifest.json`.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of the `build_site` pipeline.
#[derive(Debug)]
pub struct BuildResult {
    /// One outcome per discovered document, in discovery order.
    pub run: RunResult,
    /// Path to the written `index.html`.
    pub index_path: PathBuf,
    /// Path to the written `manifest.json`.
    pub manifest_path: PathBuf,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter {
    /// Called once discovery has finished.
    fn discovered(&self, count: usize);
    /// Called before a document is handed to the converter.
    fn document_started(&self, document: &Document, current: usize, total: usize);
    /// Called with each document's outcome.
    fn document_finished(&self, outcome: &Outcome);
    /// Called when the pipeline completes.
    fn done(&self, result: &BuildResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn discovered(&self, _count: usize) {}
    fn document_started(&self, _document: &Document, _current: usize, _total: usize) {}
    fn document_finished(&self, _outcome: &Outcome) {}
    fn done(&self, _result: &BuildResult) {}
}

/// Run the full build.
///
/// 1. Create the output directory (and parents)
/// 2. Discover notebooks under the root
/// 3. Execute each one, strictly in sequence
/// 4. Write `index.html` and `manifest.json`
///
/// Per-document failures are recorded in the returned [`RunResult`]; only
/// configuration and filesystem errors abort the run.
#[instrument(skip_all, fields(root = %config.root.display(), output_dir = %config.output_dir.display()))]
pub async fn build_site<C: Converter>(
    config: &RunConfig,
    converter: &C,
    progress: &dyn ProgressReporter,
) -> Result<BuildResult> {
    let start = Instant::now();

    // --- Phase 1: Output directory ---
    std::fs::create_dir_all(&config.output_dir)
        .map_err(|e| NbReportError::io(&config.output_dir, e))?;

    // --- Phase 2: Discovery ---
    let discovery = DiscoveryOptions::from_config(&config.discovery)?;
    let documents = nbreport_discovery::discover(&config.root, &config.output_dir, &discovery)?;
    progress.discovered(documents.len());

    // --- Phase 3: Execute ---
    let execute = ExecuteOptions {
        output_dir: config.output_dir.clone(),
        timeout: config.timeout,
    };

    let mut run = RunResult::new();
    let total = documents.len();
    for (i, document) in documents.iter().enumerate() {
        progress.document_started(document, i + 1, total);
        let outcome = nbreport_executor::execute_document(converter, document, &execute).await?;
        progress.document_finished(&outcome);
        run.record(outcome);
    }
    debug_assert_eq!(run.len(), documents.len());

    // --- Phase 4: Index + manifest ---
    let index_path = nbreport_reporter::write_index(&config.output_dir, &run)?;
    let meta = ManifestMeta {
        tool_version: TOOL_VERSION.to_string(),
        timeout_secs: config.timeout.as_secs(),
        generated_at: Utc::now(),
    };
    let manifest_path = nbreport_reporter::write_manifest(&config.output_dir, &run, &meta)?;

    let result = BuildResult {
        run,
        index_path,
        manifest_path,
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        total = result.run.len(),
        succeeded = result.run.succeeded(),
        failed = result.run.failed(),
        elapsed_ms = result.elapsed.as_millis(),
        "build complete"
    );

    Ok(result)
}
