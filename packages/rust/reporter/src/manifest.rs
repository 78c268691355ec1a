//! `manifest.json`: machine-readable summary of one run.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use nbreport_shared::{MANIFEST_FILE, NbReportError, Result, RunResult, slash_path};

/// Current schema version for the manifest format.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

/// Run-level facts recorded alongside the outcomes.
#[derive(Debug, Clone)]
pub struct ManifestMeta {
    /// Tool version that produced the run.
    pub tool_version: String,
    /// Per-notebook time budget in seconds.
    pub timeout_secs: u64,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
}

/// The `manifest.json` structure stored at the root of the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub schema_version: u32,
    pub tool_version: String,
    pub generated_at: DateTime<Utc>,
    pub timeout_secs: u64,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub outcomes: Vec<ManifestEntry>,
}

/// One outcome plus a checksum of the report it left behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub source_path: String,
    pub report_path: String,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub duration_ms: u64,
    /// SHA-256 of the report file, if it exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Build the manifest for `run`, hashing each report under `output_dir`.
pub fn build_manifest(output_dir: &Path, run: &RunResult, meta: &ManifestMeta) -> RunManifest {
    let outcomes = run
        .outcomes()
        .iter()
        .map(|outcome| {
            let report = output_dir.join(outcome.report_path());
            let (sha256, size_bytes) = match std::fs::read(&report) {
                Ok(bytes) => (Some(sha256_hex(&bytes)), Some(bytes.len() as u64)),
                Err(e) => {
                    debug!(path = %report.display(), error = %e, "report not readable, no checksum");
                    (None, None)
                }
            };
            ManifestEntry {
                source_path: slash_path(outcome.source_path()),
                report_path: slash_path(outcome.report_path()),
                succeeded: outcome.succeeded(),
                error_detail: outcome.error_detail().map(String::from),
                duration_ms: outcome.duration_ms(),
                sha256,
                size_bytes,
            }
        })
        .collect();

    RunManifest {
        schema_version: MANIFEST_SCHEMA_VERSION,
        tool_version: meta.tool_version.clone(),
        generated_at: meta.generated_at,
        timeout_secs: meta.timeout_secs,
        total: run.len(),
        succeeded: run.succeeded(),
        failed: run.failed(),
        outcomes,
    }
}

/// Write `manifest.json` (pretty-printed) and return its path.
#[instrument(skip_all, fields(output_dir = %output_dir.display()))]
pub fn write_manifest(output_dir: &Path, run: &RunResult, meta: &ManifestMeta) -> Result<PathBuf> {
    let manifest = build_manifest(output_dir, run, meta);
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| NbReportError::Render(format!("manifest serialization failed: {e}")))?;

    let path = output_dir.join(MANIFEST_FILE);
    crate::write_atomic(&path, json.as_bytes())?;
    debug!(path = %path.display(), "wrote manifest");
    Ok(path)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nbreport_shared::{Document, Outcome};

    fn meta() -> ManifestMeta {
        ManifestMeta {
            tool_version: "0.1.0-test".into(),
            timeout_secs: 600,
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn manifest_counts_and_checksums() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("a")).unwrap();
        std::fs::write(tmp.path().join("a/x.html"), "<html>ok</html>").unwrap();

        let a = Document::new(Path::new("."), "a/x.ipynb");
        let b = Document::new(Path::new("."), "b/y.ipynb");
        let run: RunResult = [
            Outcome::success(&a, 20),
            Outcome::failure(&b, "converter exited with status 1", 3),
        ]
        .into_iter()
        .collect();

        let manifest = build_manifest(tmp.path(), &run, &meta());

        assert_eq!(manifest.schema_version, MANIFEST_SCHEMA_VERSION);
        assert_eq!(manifest.total, 2);
        assert_eq!(manifest.succeeded, 1);
        assert_eq!(manifest.failed, 1);
        assert_eq!(manifest.outcomes[0].report_path, "a/x.html");
        assert_eq!(manifest.outcomes[0].sha256.as_ref().map(String::len), Some(64));
        assert_eq!(manifest.outcomes[0].size_bytes, Some(15));
        assert!(manifest.outcomes[1].sha256.is_none());
        assert_eq!(
            manifest.outcomes[1].error_detail.as_deref(),
            Some("converter exited with status 1")
        );
    }

    #[test]
    fn write_manifest_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_manifest(tmp.path(), &RunResult::new(), &meta()).unwrap();

        let parsed: RunManifest =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.total, 0);
        assert_eq!(parsed.tool_version, "0.1.0-test");
        assert!(parsed.outcomes.is_empty());
    }
}
