//! Notebook discovery.
//!
//! Walks a search root recursively and returns every eligible notebook,
//! skipping checkpoint directories, the output directory, and any configured
//! exclusions. Results are sorted by relative path so that downstream
//! reports are stable across runs.

mod filter;

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use nbreport_shared::{DiscoveryConfig, Document, NbReportError, Result, slash_path};
use tracing::{debug, info, instrument, warn};

pub use filter::ExclusionRules;

// ---------------------------------------------------------------------------
// Discovery options
// ---------------------------------------------------------------------------

/// Configuration for the discovery walk.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// File extension (without the dot) of eligible documents.
    pub extension: String,
    /// Compiled exclusion rules.
    pub rules: ExclusionRules,
}

impl DiscoveryOptions {
    /// Compile options from the `[discovery]` config section.
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self> {
        Ok(Self {
            extension: config.extension.trim_start_matches('.').to_string(),
            rules: ExclusionRules::new(&config.exclude_segments, &config.exclude_patterns)?,
        })
    }
}

impl Default for DiscoveryOptions {
    /// Same walk as an empty `[discovery]` config section.
    fn default() -> Self {
        let config = DiscoveryConfig::default();
        Self {
            extension: config.extension,
            rules: ExclusionRules::from_segments(&config.exclude_segments),
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Find all eligible documents under `root`.
///
/// `output_dir` is pruned from the walk when it lies inside `root`; the
/// comparison uses canonical paths so `site` and `./site` are the same
/// directory. Symlinked directories are not followed. An empty result is
/// not an error.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn discover(root: &Path, output_dir: &Path, opts: &DiscoveryOptions) -> Result<Vec<Document>> {
    if !root.is_dir() {
        return Err(NbReportError::discovery(format!(
            "search root '{}' is not a directory",
            root.display()
        )));
    }

    let walker = Walker {
        root,
        output_dir: output_dir.canonicalize().ok(),
        opts,
    };

    let mut documents = Vec::new();
    walker.walk(root, &mut documents)?;
    documents.sort();

    info!(count = documents.len(), "discovery complete");
    Ok(documents)
}

// ---------------------------------------------------------------------------
// Walker
// ---------------------------------------------------------------------------

struct Walker<'a> {
    root: &'a Path,
    output_dir: Option<PathBuf>,
    opts: &'a DiscoveryOptions,
}

impl Walker<'_> {
    fn walk(&self, dir: &Path, out: &mut Vec<Document>) -> Result<()> {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            // The root itself must be readable; anything deeper is skipped.
            Err(e) if dir == self.root => return Err(NbReportError::io(dir, e)),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory");
                return Ok(());
            }
        };

        for entry in entries {
            let entry = entry.map_err(|e| NbReportError::io(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| NbReportError::io(&path, e))?;

            if file_type.is_dir() {
                if self.opts.rules.skips_dir(&entry.file_name()) {
                    debug!(dir = %path.display(), "excluded directory");
                    continue;
                }
                if self.is_output_dir(&path) {
                    debug!(dir = %path.display(), "skipping output directory");
                    continue;
                }
                self.walk(&path, out)?;
            } else if (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
                && path.extension() == Some(OsStr::new(&self.opts.extension))
            {
                let Ok(relative) = path.strip_prefix(self.root) else {
                    continue;
                };
                if self.opts.rules.skips_file(&slash_path(relative)) {
                    debug!(file = %relative.display(), "excluded by pattern");
                    continue;
                }
                out.push(Document::new(self.root, relative));
            }
        }

        Ok(())
    }

    fn is_output_dir(&self, path: &Path) -> bool {
        match (&self.output_dir, path.canonicalize()) {
            (Some(output), Ok(canonical)) => canonical == *output,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "{}").unwrap();
    }

    fn names(docs: &[Document]) -> Vec<String> {
        docs.iter().map(Document::display_name).collect()
    }

    #[test]
    fn finds_nested_notebooks_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "b/y.ipynb");
        touch(tmp.path(), "a/x.ipynb");
        touch(tmp.path(), "top.ipynb");
        touch(tmp.path(), "a/notes.md");

        let docs = discover(tmp.path(), &tmp.path().join("site"), &DiscoveryOptions::default())
            .unwrap();

        assert_eq!(names(&docs), vec!["a/x.ipynb", "b/y.ipynb", "top.ipynb"]);
        assert_eq!(docs[0].path(), tmp.path().join("a/x.ipynb"));
    }

    #[test]
    fn skips_checkpoints() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a/x.ipynb");
        touch(tmp.path(), "a/.ipynb_checkpoints/x-checkpoint.ipynb");

        let docs = discover(tmp.path(), &tmp.path().join("site"), &DiscoveryOptions::default())
            .unwrap();

        assert_eq!(names(&docs), vec!["a/x.ipynb"]);
    }

    #[test]
    fn skips_output_directory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "x.ipynb");
        touch(tmp.path(), "site/main/x.ipynb");

        // Relative spelling with a `.` component still matches.
        let output = tmp.path().join("site/./main");
        let docs = discover(tmp.path(), &output, &DiscoveryOptions::default()).unwrap();

        assert_eq!(names(&docs), vec!["x.ipynb"]);
    }

    #[test]
    fn skips_configured_segments_and_patterns() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "keep/a.ipynb");
        touch(tmp.path(), ".git/hooks/b.ipynb");
        touch(tmp.path(), "vendor/c.ipynb");
        touch(tmp.path(), "keep/d-draft.ipynb");

        let config = DiscoveryConfig {
            extension: "ipynb".into(),
            exclude_segments: vec![".git".into(), "vendor".into()],
            exclude_patterns: vec!["-draft\\.ipynb$".into()],
        };
        let opts = DiscoveryOptions::from_config(&config).unwrap();
        let docs = discover(tmp.path(), &tmp.path().join("site"), &opts).unwrap();

        assert_eq!(names(&docs), vec!["keep/a.ipynb"]);
    }

    #[test]
    fn extension_is_configurable() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.ipynb");
        touch(tmp.path(), "b.py");

        let config = DiscoveryConfig {
            extension: ".py".into(),
            ..DiscoveryConfig::default()
        };
        let opts = DiscoveryOptions::from_config(&config).unwrap();
        let docs = discover(tmp.path(), &tmp.path().join("site"), &opts).unwrap();

        assert_eq!(names(&docs), vec!["b.py"]);
    }

    #[test]
    fn empty_tree_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = discover(tmp.path(), &tmp.path().join("site"), &DiscoveryOptions::default())
            .unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = discover(
            &tmp.path().join("nope"),
            &tmp.path().join("site"),
            &DiscoveryOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[test]
    fn discovery_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["z.ipynb", "m/n.ipynb", "a/b/c.ipynb", "a/a.ipynb"] {
            touch(tmp.path(), name);
        }
        let opts = DiscoveryOptions::default();
        let first = discover(tmp.path(), &tmp.path().join("site"), &opts).unwrap();
        let second = discover(tmp.path(), &tmp.path().join("site"), &opts).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            names(&first),
            vec!["a/a.ipynb", "a/b/c.ipynb", "m/n.ipynb", "z.ipynb"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn does_not_follow_symlinked_directories() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "real/a.ipynb");
        std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();

        let docs = discover(tmp.path(), &tmp.path().join("site"), &DiscoveryOptions::default())
            .unwrap();
        assert_eq!(names(&docs), vec!["real/a.ipynb"]);
    }

    #[test]
    fn default_options_match_default_config() {
        let tmp = tempfile::tempdir().unwrap();
        touch(tmp.path(), "a.ipynb");
        touch(tmp.path(), ".git/objects/b.ipynb");

        let from_default = discover(
            tmp.path(),
            &tmp.path().join("site"),
            &DiscoveryOptions::default(),
        )
        .unwrap();
        let from_config = discover(
            tmp.path(),
            &tmp.path().join("site"),
            &DiscoveryOptions::from_config(&DiscoveryConfig::default()).unwrap(),
        )
        .unwrap();

        assert_eq!(names(&from_default), vec!["a.ipynb"]);
        assert_eq!(from_default, from_config);
    }
}
