//! Application configuration for nbreport.
//!
//! User config lives at `~/.nbreport/nbreport.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{NbReportError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "nbreport.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".nbreport";

/// Default per-notebook execution budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

/// Directory Jupyter uses for autosave checkpoints. Always excluded from discovery.
pub const CHECKPOINT_DIR: &str = ".ipynb_checkpoints";

// ---------------------------------------------------------------------------
// Config structs (matching nbreport.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// External converter invocation.
    #[serde(default)]
    pub converter: ConverterConfig,

    /// Discovery rules.
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Per-notebook execution budget in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Exit non-zero when any notebook fails.
    #[serde(default)]
    pub fail_on_error: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            fail_on_error: false,
        }
    }
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// `[converter]` section.
///
/// The converter is invoked as `<program> <args...>` followed by the
/// nbconvert flags that select HTML output, execution, timeout, and output
/// location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Executable to spawn.
    #[serde(default = "default_program")]
    pub program: String,

    /// Leading arguments placed before the generated flags.
    #[serde(default = "default_converter_args")]
    pub args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_converter_args(),
        }
    }
}

fn default_program() -> String {
    "jupyter".into()
}
fn default_converter_args() -> Vec<String> {
    vec!["nbconvert".into()]
}

/// `[discovery]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// File extension (without the dot) of eligible documents.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Path components that exclude everything beneath them.
    /// The checkpoint directory is excluded regardless of this list.
    #[serde(default = "default_exclude_segments")]
    pub exclude_segments: Vec<String>,

    /// Regular expressions matched against the `/`-separated relative path.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            exclude_segments: default_exclude_segments(),
            exclude_patterns: Vec::new(),
        }
    }
}

fn default_extension() -> String {
    "ipynb".into()
}
fn default_exclude_segments() -> Vec<String> {
    vec![".git".into()]
}

// ---------------------------------------------------------------------------
// Run config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime configuration for one invocation, merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory searched for notebooks.
    pub root: PathBuf,
    /// Directory receiving reports, `index.html`, and `manifest.json`.
    pub output_dir: PathBuf,
    /// Per-notebook execution budget.
    pub timeout: Duration,
    /// Converter invocation.
    pub converter: ConverterConfig,
    /// Discovery rules.
    pub discovery: DiscoveryConfig,
    /// Exit non-zero when any notebook fails.
    pub fail_on_error: bool,
}

impl RunConfig {
    /// Build a run config from the loaded app config and the two required paths.
    pub fn new(config: &AppConfig, root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            output_dir: output_dir.into(),
            timeout: Duration::from_secs(config.defaults.timeout_secs),
            converter: config.converter.clone(),
            discovery: config.discovery.clone(),
            fail_on_error: config.defaults.fail_on_error,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.nbreport/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| NbReportError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.nbreport/nbreport.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = match config_file_path() {
        Ok(path) => path,
        Err(e) => {
            tracing::debug!(error = %e, "no home directory, using default config");
            return Ok(AppConfig::default());
        }
    };

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| NbReportError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        NbReportError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    if config.defaults.timeout_secs == 0 {
        return Err(NbReportError::config(format!(
            "{}: timeout_secs must be greater than zero",
            path.display()
        )));
    }

    tracing::debug!(?path, "loaded config file");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("timeout_secs = 600"));
        assert!(toml_str.contains("jupyter"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(parsed.converter.args, vec!["nbconvert".to_string()]);
        assert_eq!(parsed.discovery.extension, "ipynb");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[converter]
program = "python3"
args = ["-m", "jupyter", "nbconvert"]

[discovery]
exclude_patterns = ["^scratch/"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.converter.program, "python3");
        assert_eq!(config.converter.args.len(), 3);
        assert_eq!(config.discovery.exclude_patterns, vec!["^scratch/".to_string()]);
        assert_eq!(config.discovery.exclude_segments, vec![".git".to_string()]);
        assert_eq!(config.defaults.timeout_secs, 600);
        assert!(!config.defaults.fail_on_error);
    }

    #[test]
    fn run_config_from_app_config() {
        let app = AppConfig::default();
        let run = RunConfig::new(&app, ".", "site");
        assert_eq!(run.timeout, Duration::from_secs(600));
        assert_eq!(run.output_dir, PathBuf::from("site"));
        assert_eq!(run.converter.program, "jupyter");
        assert!(!run.fail_on_error);
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbreport.toml");
        std::fs::write(&path, "[defaults]\ntimeout_secs = 30\nfail_on_error = true\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.timeout_secs, 30);
        assert!(config.defaults.fail_on_error);
    }

    #[test]
    fn load_config_rejects_zero_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbreport.toml");
        std::fs::write(&path, "[defaults]\ntimeout_secs = 0\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nbreport.toml");
        std::fs::write(&path, "[defaults\n").unwrap();

        let err = load_config_from(&path).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
