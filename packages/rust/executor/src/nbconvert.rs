//! `jupyter nbconvert` subprocess runner.
//!
//! Spawns the configured converter with flags selecting HTML output,
//! in-place execution, a per-cell timeout, and the report location, then
//! enforces the same budget as a wall-clock deadline on the whole process.

use std::ffi::OsString;
use std::process::Stdio;
use std::time::Duration;

use nbreport_shared::ConverterConfig;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::converter::{ConvertOutput, ConvertRequest, ConvertStatus, Converter};

/// Maximum stdout or stderr size captured per stream (10 MiB).
const MAX_OUTPUT_BYTES: u64 = 10 * 1024 * 1024;

/// How long to wait for output streams to drain once the process is gone.
/// Kernels spawned by the converter can hold the pipes open after it exits.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Runs `<program> <args...> --to html --execute ...` per notebook.
#[derive(Debug, Clone)]
pub struct NbconvertConverter {
    program: String,
    args: Vec<String>,
}

impl NbconvertConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Full argument list passed to the program for one request.
    pub fn command_args(&self, request: &ConvertRequest) -> Vec<OsString> {
        let mut args: Vec<OsString> = self.args.iter().map(OsString::from).collect();
        let generated: [OsString; 9] = [
            "--to".into(),
            "html".into(),
            "--execute".into(),
            format!("--ExecutePreprocessor.timeout={}", request.timeout.as_secs().max(1)).into(),
            "--output-dir".into(),
            request.output_dir.clone().into_os_string(),
            "--output".into(),
            request.output_name.clone().into(),
            request.notebook.clone().into_os_string(),
        ];
        args.extend(generated);
        args
    }
}

impl Default for NbconvertConverter {
    fn default() -> Self {
        Self::new(&ConverterConfig::default())
    }
}

impl Converter for NbconvertConverter {
    async fn convert(&self, request: &ConvertRequest) -> ConvertOutput {
        let args = self.command_args(request);
        debug!(program = %self.program, ?args, "spawning converter");

        // `kill_on_drop(true)` ensures the child is killed when dropped (e.g. on timeout).
        let mut child = match Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                warn!(program = %self.program, error = %e, "failed to spawn converter");
                return ConvertOutput {
                    status: ConvertStatus::SpawnFailed {
                        message: format!("{}: {e}", self.program),
                    },
                    stdout: String::new(),
                    stderr: String::new(),
                };
            }
        };

        let stdout_task = tokio::spawn(read_stream(child.stdout.take()));
        let stderr_task = tokio::spawn(read_stream(child.stderr.take()));

        let status = match tokio::time::timeout(request.timeout, child.wait()).await {
            Ok(Ok(status)) => ConvertStatus::Exited {
                code: status.code(),
            },
            Ok(Err(e)) => ConvertStatus::SpawnFailed {
                message: format!("failed to wait for {}: {e}", self.program),
            },
            Err(_elapsed) => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "failed to kill timed-out converter");
                }
                ConvertStatus::TimedOut {
                    after: request.timeout,
                }
            }
        };

        let stdout = drain(stdout_task).await;
        let stderr = drain(stderr_task).await;

        ConvertOutput {
            status,
            stdout,
            stderr,
        }
    }
}

/// Read an entire output stream into a byte buffer, capped at [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.take(MAX_OUTPUT_BYTES).read_to_end(&mut buf).await;
    }
    buf
}

/// Collect a reader task's output, giving up after [`DRAIN_GRACE`].
async fn drain(task: tokio::task::JoinHandle<Vec<u8>>) -> String {
    match tokio::time::timeout(DRAIN_GRACE, task).await {
        Ok(Ok(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
        Ok(Err(e)) => {
            warn!(error = %e, "output reader task failed");
            String::new()
        }
        Err(_) => {
            debug!("output stream still open after converter exit, discarding");
            String::new()
        }
    }
}
