//! CLI definition, tracing setup, and the build command.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use nbreport_core::pipeline::{BuildResult, ProgressReporter};
use nbreport_executor::NbconvertConverter;
use nbreport_shared::{AppConfig, Document, Outcome, RunConfig, load_config, load_config_from};
use tracing::info;

const USAGE: &str = "Usage: nbreport <output_dir> [--timeout SECONDS]";

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Execute notebooks and publish HTML reports.
#[derive(Parser)]
#[command(
    name = "nbreport",
    version,
    about = "Execute every notebook under a directory and publish HTML reports with an index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Directory receiving the reports, index.html, and manifest.json.
    pub output_dir: Option<PathBuf>,

    /// Per-notebook execution budget in seconds [default: 600].
    #[arg(long, env = "NBREPORT_TIMEOUT", value_name = "SECONDS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Directory searched for notebooks.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Extra path segment to exclude (repeatable).
    #[arg(long = "exclude", value_name = "SEGMENT")]
    pub exclude: Vec<String>,

    /// Config file (defaults to ~/.nbreport/nbreport.toml).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Exit with status 1 when any notebook fails.
    #[arg(long)]
    pub fail_on_error: bool,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr; stdout carries
/// the console summary.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "nbreport=warn",
        1 => "nbreport=info",
        2 => "nbreport=debug",
        _ => "nbreport=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// Run the build and map the result to a process exit status.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    let Some(output_dir) = cli.output_dir.clone() else {
        println!("{USAGE}");
        return Ok(ExitCode::from(1));
    };

    let app = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    let config = resolve_config(&cli, &app, output_dir);

    info!(
        root = %config.root.display(),
        output_dir = %config.output_dir.display(),
        timeout_secs = config.timeout.as_secs(),
        converter = %config.converter.program,
        "building notebook reports"
    );

    let converter = NbconvertConverter::new(&config.converter);
    let result = nbreport_core::pipeline::build_site(&config, &converter, &ConsoleProgress)
        .await
        .wrap_err_with(|| format!("build into '{}' failed", config.output_dir.display()))?;

    if config.fail_on_error && result.run.failed() > 0 {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Merge CLI flags over the loaded config.
fn resolve_config(cli: &Cli, app: &AppConfig, output_dir: PathBuf) -> RunConfig {
    let mut config = RunConfig::new(app, cli.root.clone(), output_dir);
    if let Some(secs) = cli.timeout {
        config.timeout = std::time::Duration::from_secs(secs);
    }
    config
        .discovery
        .exclude_segments
        .extend(cli.exclude.iter().cloned());
    config.fail_on_error |= cli.fail_on_error;
    config
}

// ---------------------------------------------------------------------------
// Console progress
// ---------------------------------------------------------------------------

/// Prints one line per step to stdout.
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn discovered(&self, count: usize) {
        if count == 0 {
            println!("No notebooks found.");
        } else {
            println!("Found {count} notebook(s)");
        }
    }

    fn document_started(&self, document: &Document, _current: usize, _total: usize) {
        println!("Processing: {}", document.display_name());
    }

    fn document_finished(&self, outcome: &Outcome) {
        let source = outcome.source_path().display();
        if outcome.succeeded() {
            println!("  \u{2713} Successfully converted: {source}");
        } else {
            let reason = outcome
                .error_detail()
                .and_then(|d| d.lines().next())
                .unwrap_or("unknown error");
            println!("  \u{2717} Failed to convert {source}: {reason}");
        }
    }

    fn done(&self, result: &BuildResult) {
        let output_dir = result
            .index_path
            .parent()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        println!();
        println!("\u{2713} Build complete. Output in: {output_dir}");
        println!(
            "  Notebooks: {} succeeded, {} failed",
            result.run.succeeded(),
            result.run.failed()
        );
        println!("  Generated index: {}", result.index_path.display());
        println!("  Time: {:.1}s", result.elapsed.as_secs_f64());
    }
}
