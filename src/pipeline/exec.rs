//! Subprocess execution with a hard deadline.
//!
//! The child is spawned with `kill_on_drop(true)` and its stdout/stderr are
//! drained on separate tasks. Only the wait for exit runs under
//! `tokio::time::timeout`; when the deadline fires the child is killed and
//! whatever it had written to stderr is kept on the timeout error.

use crate::error::{Html2ImageError, Result};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// A fully built engine command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Args as lossy strings, for logs and assertions.
    pub fn display_args(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

/// What the engine wrote.
#[derive(Debug)]
pub struct ProcessOutput {
    pub stdout: Vec<u8>,
    pub stderr: String,
    pub elapsed: Duration,
}

/// Run `invocation`, failing with [`Html2ImageError::Timeout`] after `deadline`.
///
/// `engine` is only used to label errors and logs.
pub async fn run(
    engine: &str,
    invocation: &Invocation,
    deadline: Duration,
) -> Result<ProcessOutput> {
    debug!(
        engine,
        program = %invocation.program.display(),
        args = ?invocation.display_args(),
        "Spawning engine"
    );

    let start = Instant::now();
    let mut child = Command::new(&invocation.program)
        .args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| Html2ImageError::EngineUnavailable {
            binary: invocation.program.clone(),
            source,
        })?;

    // Pipes are drained concurrently; a full pipe would otherwise stall the engine.
    let stdout_task = tokio::spawn(drain(child.stdout.take()));
    let mut stderr_task = tokio::spawn(drain(child.stderr.take()));

    let status = match tokio::time::timeout(deadline, child.wait()).await {
        Ok(result) => result.map_err(|e| {
            Html2ImageError::Internal(format!("failed waiting for {engine}: {e}"))
        })?,
        Err(_) => {
            if let Err(e) = child.kill().await {
                warn!(engine, error = %e, "Failed to kill engine after deadline");
            }
            stdout_task.abort();
            // A grandchild may still hold the pipe open; give up after a grace period.
            let stderr = match tokio::time::timeout(KILL_GRACE, &mut stderr_task).await {
                Ok(Ok(Ok(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                _ => {
                    stderr_task.abort();
                    String::new()
                }
            };
            warn!(
                engine,
                secs = deadline.as_secs(),
                stderr = %stderr.trim(),
                "Engine exceeded deadline, killed"
            );
            return Err(Html2ImageError::Timeout {
                engine: engine.to_string(),
                secs: deadline.as_secs(),
                stderr,
            });
        }
    };

    let stdout = join_reader(engine, stdout_task).await?;
    let stderr = String::from_utf8_lossy(&join_reader(engine, stderr_task).await?).into_owned();
    if !status.success() {
        warn!(engine, status = %status, stderr = %stderr.trim(), "Engine failed");
        return Err(Html2ImageError::ConversionFailed {
            engine: engine.to_string(),
            status: status.to_string(),
            stderr,
        });
    }

    Ok(ProcessOutput {
        stdout,
        stderr,
        elapsed: start.elapsed(),
    })
}

/// How long to wait for stderr after killing a timed-out engine.
const KILL_GRACE: Duration = Duration::from_millis(500);

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn join_reader(
    engine: &str,
    task: JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>> {
    task.await
        .map_err(|e| Html2ImageError::Internal(format!("{engine} output reader failed: {e}")))?
        .map_err(|e| Html2ImageError::Internal(format!("failed reading {engine} output: {e}")))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::spawn_lock;

    fn sh(script: &str) -> Invocation {
        Invocation::new("/bin/sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr_separately() {
        let _guard = spawn_lock();
        let out = run("sh", &sh("printf out; printf err >&2"), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(out.stdout, b"out");
        assert_eq!(out.stderr, "err");
    }

    #[tokio::test]
    async fn non_zero_exit_embeds_stderr() {
        let _guard = spawn_lock();
        let err = run("sh", &sh("echo boom >&2; exit 3"), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            Html2ImageError::ConversionFailed { stderr, status, .. } => {
                assert_eq!(stderr.trim(), "boom");
                assert!(status.contains('3'), "status: {status}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_kills_the_child() {
        let _guard = spawn_lock();
        let start = Instant::now();
        let err = run("sh", &sh("exec sleep 10"), Duration::from_millis(300))
            .await
            .unwrap_err();
        assert!(matches!(err, Html2ImageError::Timeout { .. }));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn deadline_keeps_stderr_written_so_far() {
        let _guard = spawn_lock();
        let script = "echo 'Loading page (1/2)' >&2; exec sleep 10";
        let err = run("sh", &sh(script), Duration::from_millis(500))
            .await
            .unwrap_err();
        match err {
            Html2ImageError::Timeout { stderr, secs, .. } => {
                assert_eq!(stderr.trim(), "Loading page (1/2)");
                assert_eq!(secs, 0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_engine_unavailable() {
        let _guard = spawn_lock();
        let inv = Invocation::new("/nonexistent/html2image-engine");
        let err = run("missing", &inv, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, Html2ImageError::EngineUnavailable { .. }));
    }
}
