//! Exclusion rules applied while walking the search root.

use std::ffi::OsStr;
use std::path::Path;

use nbreport_shared::{CHECKPOINT_DIR, NbReportError, Result};
use regex::Regex;

/// Compiled exclusion rules.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    segments: Vec<String>,
    patterns: Vec<Regex>,
}

impl ExclusionRules {
    /// Compile the configured segments and patterns.
    ///
    /// Fails with a config error naming the first pattern that does not compile.
    pub fn new(segments: &[String], patterns: &[String]) -> Result<Self> {
        let mut rules = Self::from_segments(segments);
        rules.patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    NbReportError::config(format!("invalid exclude pattern '{p}': {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(rules)
    }

    /// Segment-only rules; these cannot fail to build.
    pub fn from_segments(segments: &[String]) -> Self {
        Self {
            segments: segments.to_vec(),
            patterns: Vec::new(),
        }
    }

    /// Whether a directory with this name is pruned from the walk.
    pub fn skips_dir(&self, name: &OsStr) -> bool {
        name == CHECKPOINT_DIR || self.segments.iter().any(|s| name == s.as_str())
    }

    /// Whether a candidate file (given as its `/`-separated relative path) is excluded.
    pub fn skips_file(&self, relative: &str) -> bool {
        let path = Path::new(relative);
        let in_excluded_dir = path
            .parent()
            .map(|parent| parent.iter().any(|c| self.skips_dir(c)))
            .unwrap_or(false);

        in_excluded_dir || self.patterns.iter().any(|re| re.is_match(relative))
    }
}
