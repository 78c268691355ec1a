//! Shared types, error model, and configuration for nbreport.
//!
//! This crate is the foundation depended on by all other nbreport crates.
//! It provides:
//! - [`NbReportError`]: the unified error type
//! - Domain types ([`Document`], [`Outcome`], [`RunResult`])
//! - Configuration ([`AppConfig`], [`RunConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CHECKPOINT_DIR, ConverterConfig, DEFAULT_TIMEOUT_SECS, DefaultsConfig,
    DiscoveryConfig, RunConfig, config_dir, config_file_path, load_config, load_config_from,
};
pub use error::{NbReportError, Result};
pub use types::{Document, INDEX_FILE, MANIFEST_FILE, Outcome, RunResult, slash_path};
