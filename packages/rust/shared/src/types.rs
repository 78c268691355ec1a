//! Core domain types for an nbreport run.

use std::path::{Component, Path, PathBuf};

/// File name of the index page at the root of the output directory.
pub const INDEX_FILE: &str = "index.html";

/// File name of the run manifest at the root of the output directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Render a relative path with `/` separators, for links and log lines.
pub fn slash_path(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A discovered notebook, identified by its path relative to the search root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Document {
    relative_path: PathBuf,
    path: PathBuf,
}

impl Document {
    /// Create a document found at `root/relative_path`.
    pub fn new(root: &Path, relative_path: impl Into<PathBuf>) -> Self {
        let relative_path = relative_path.into();
        let path = root.join(&relative_path);
        Self {
            relative_path,
            path,
        }
    }

    /// Path relative to the search root (e.g. `a/x.ipynb`).
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Path usable from the current working directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Report location relative to the output directory (`a/x.ipynb` → `a/x.html`).
    ///
    /// A root-level notebook that would land on [`INDEX_FILE`] keeps its full
    /// file name instead (`index.ipynb` → `index.ipynb.html`). The same applies
    /// to `index.ipynb.ipynb` and so on, which keeps the mapping one-to-one.
    pub fn report_relative_path(&self) -> PathBuf {
        if self.shadows_index() {
            let mut name = self.relative_path.as_os_str().to_os_string();
            name.push(".html");
            return PathBuf::from(name);
        }
        self.relative_path.with_extension("html")
    }

    /// Whether this is a root-level `index(.ext)*.ext` notebook.
    fn shadows_index(&self) -> bool {
        if self.relative_path.components().count() != 1 {
            return false;
        }
        let path = &self.relative_path;
        let (Some(stem), Some(ext)) = (path.file_stem(), path.extension()) else {
            return false;
        };
        let stem = stem.to_string_lossy();
        let suffix = format!(".{}", ext.to_string_lossy());
        let mut base: &str = &stem;
        while let Some(rest) = base.strip_suffix(suffix.as_str()) {
            base = rest;
        }
        format!("{base}.html").eq_ignore_ascii_case(INDEX_FILE)
    }

    /// `/`-separated relative path for display.
    pub fn display_name(&self) -> String {
        slash_path(&self.relative_path)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// The recorded result of executing and rendering one document.
///
/// Built once by the executor and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    source_path: PathBuf,
    report_path: PathBuf,
    succeeded: bool,
    error_detail: Option<String>,
    duration_ms: u64,
}

impl Outcome {
    /// A document whose converter run produced its report.
    pub fn success(document: &Document, duration_ms: u64) -> Self {
        Self {
            source_path: document.relative_path().to_path_buf(),
            report_path: document.report_relative_path(),
            succeeded: true,
            error_detail: None,
            duration_ms,
        }
    }

    /// A document whose converter run failed, timed out, or could not start.
    pub fn failure(document: &Document, detail: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            source_path: document.relative_path().to_path_buf(),
            report_path: document.report_relative_path(),
            succeeded: false,
            error_detail: Some(detail.into()),
            duration_ms,
        }
    }

    /// Notebook path relative to the search root.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Report path relative to the output directory.
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn error_detail(&self) -> Option<&str> {
        self.error_detail.as_deref()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

// ---------------------------------------------------------------------------
// RunResult
// ---------------------------------------------------------------------------

/// Ordered outcomes for one invocation. Only grows; outcomes are never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunResult {
    outcomes: Vec<Outcome>,
}

impl RunResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the outcome for the next document.
    pub fn record(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Number of documents that rendered successfully.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.succeeded()).count()
    }

    /// Number of documents that failed.
    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }
}

impl FromIterator<Outcome> for RunResult {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        Self {
            outcomes: iter.into_iter().collect(),
        }
    }
}
