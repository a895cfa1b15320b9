//! Shell command execution with a time bound.

use crate::handler::{decode, require};
use crate::{Result, ToolError};
use serde::Deserialize;
use std::io::{ErrorKind, PipeReader, Read};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::process::Command;
use tokio::sync::oneshot;

/// Time bound applied when the caller gives none.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How long to keep draining output after the shell has exited.
const OUTPUT_GRACE: Duration = Duration::from_millis(200);

#[derive(Debug, Deserialize)]
struct TerminalRunArgs {
    command: String,
    /// Seconds. Zero or negative falls back to the default.
    #[serde(default)]
    timeout: Option<i64>,
}

/// `terminal_run`: run a command through the host shell.
///
/// stdout and stderr share one pipe, so the output keeps the order the
/// command wrote it in. The time bound covers the shell process only: once it
/// exits, output still held open by background jobs is collected for a short
/// grace period and then returned as is. A non-zero exit status is still a
/// successful result; only launch failures and timeouts are errors. On
/// timeout the shell is killed.
pub async fn terminal_run(arguments: Vec<u8>) -> Result<String> {
    let args: TerminalRunArgs = decode(&arguments)?;
    require("command", &args.command)?;

    let timeout = match args.timeout {
        Some(secs) if secs > 0 => Duration::from_secs(secs.unsigned_abs()),
        _ => DEFAULT_TIMEOUT,
    };

    let (reader, writer) =
        std::io::pipe().map_err(|e| ToolError::io("failed to create output pipe", e))?;
    let stderr = writer
        .try_clone()
        .map_err(|e| ToolError::io("failed to create output pipe", e))?;

    // The command owns the parent's copies of the write end; it must be
    // dropped after spawning or the reader never sees end of file.
    let mut child = {
        let mut cmd = shell(&args.command);
        cmd.stdin(Stdio::null())
            .stdout(writer)
            .stderr(stderr)
            .kill_on_drop(true);
        cmd.spawn()
            .map_err(|e| ToolError::io("failed to start command", e))?
    };
    let output = CombinedOutput::collect(reader);

    let status = match tokio::time::timeout(timeout, child.wait()).await {
        Ok(status) => status.map_err(|e| ToolError::io("failed to run command", e))?,
        Err(_) => {
            tracing::warn!(command = %args.command, ?timeout, "command timed out");
            if let Err(e) = child.kill().await {
                tracing::warn!(command = %args.command, error = %e, "failed to kill command");
            }
            return Err(ToolError::Timeout(timeout.as_secs()));
        }
    };

    let exit_code = status.code().unwrap_or(-1);
    let output = output.finish(OUTPUT_GRACE).await;
    tracing::debug!(command = %args.command, exit_code, "command finished");

    Ok(format!(
        "Command: {}\nExit Code: {exit_code}\nOutput:\n{}",
        args.command,
        String::from_utf8_lossy(&output),
    ))
}

/// Output of a command, read off a pipe on a detached thread. A background
/// job may keep the pipe open after the call returns, so the reader must not
/// be a runtime blocking task.
struct CombinedOutput {
    buffer: Arc<Mutex<Vec<u8>>>,
    done: oneshot::Receiver<()>,
}

impl CombinedOutput {
    fn collect(mut reader: PipeReader) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let (tx, done) = oneshot::channel();
        let sink = Arc::clone(&buffer);
        std::thread::spawn(move || {
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk) {
                    Ok(0) => break,
                    Ok(n) => {
                        if let Ok(mut buffer) = sink.lock() {
                            buffer.extend_from_slice(&chunk[..n]);
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(_) => break,
                }
            }
            let _ = tx.send(());
        });
        Self { buffer, done }
    }

    /// Wait up to `grace` for end of file, then take whatever arrived.
    async fn finish(self, grace: Duration) -> Vec<u8> {
        if tokio::time::timeout(grace, self.done).await.is_err() {
            tracing::debug!("output still open after exit, returning partial output");
        }
        self.buffer
            .lock()
            .map(|buffer| buffer.clone())
            .unwrap_or_default()
    }
}

#[cfg(windows)]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("powershell");
    cmd.arg("-Command").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Instant;

    fn args(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[tokio::test]
    async fn captures_output_and_exit_code() {
        let result = terminal_run(args(json!({ "command": "echo hello" })))
            .await
            .unwrap();
        assert_eq!(result, "Command: echo hello\nExit Code: 0\nOutput:\nhello\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_still_a_result() {
        let result = terminal_run(args(json!({ "command": "echo oops >&2; exit 3" })))
            .await
            .unwrap();
        assert!(result.contains("Exit Code: 3"));
        assert!(result.contains("oops"));
    }

    #[tokio::test]
    async fn timeout_kills_command() {
        let started = Instant::now();
        let err = terminal_run(args(json!({ "command": "sleep 10", "timeout": 1 })))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::Timeout(1));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn stdout_and_stderr_are_interleaved() {
        let result = terminal_run(args(json!({
            "command": "echo one; echo two >&2; echo three"
        })))
        .await
        .unwrap();
        assert!(result.ends_with("Output:\none\ntwo\nthree\n"), "{result}");
    }

    #[tokio::test]
    async fn background_job_does_not_hold_the_call() {
        let started = Instant::now();
        let result = terminal_run(args(json!({
            "command": "sleep 5 & echo started",
            "timeout": 3
        })))
        .await
        .unwrap();
        assert!(result.contains("Exit Code: 0"), "{result}");
        assert!(result.contains("started"), "{result}");
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn empty_command_is_rejected() {
        let err = terminal_run(args(json!({ "command": "" }))).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
