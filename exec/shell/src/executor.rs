//! Foreground command execution (spec §4.6 "Foreground"): runs a child
//! process in a configurable shell, captures combined output, and enforces a
//! timeout by cancelling the scoped context. On timeout the partial output
//! already captured is still returned alongside the error indication.

use crate::command::CommandResult;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use std::time::Instant;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ShellExecutor {
    shell: String,
}

impl ShellExecutor {
    pub fn new() -> Self {
        Self {
            shell: default_shell(),
        }
    }

    pub fn with_shell(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }

    /// Runs `command` in `cwd`, capped to `timeout`, clamped to
    /// `[1, MAX_TIMEOUT_SECS]`. `cancel` lets the orchestrator abort the
    /// call independent of the timeout (e.g. a user-requested stop).
    pub async fn execute(
        &self,
        command: &str,
        cwd: &Path,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> CommandResult {
        let timeout = timeout.clamp(
            Duration::from_secs(1),
            Duration::from_secs(MAX_TIMEOUT_SECS),
        );
        let start = Instant::now();

        let mut spawned = Command::new(&self.shell);
        spawned
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            spawned.process_group(0);
        }

        let mut child = match spawned.spawn() {
            Ok(child) => child,
            Err(err) => return CommandResult::spawn_failed(format!("failed to spawn: {err}")),
        };

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let stdout_buf = std::sync::Arc::new(tokio::sync::Mutex::new(Vec::<u8>::new()));
        let stderr_buf = std::sync::Arc::new(tokio::sync::Mutex::new(Vec::<u8>::new()));

        let stdout_task = stdout_pipe.take().map(|mut pipe| {
            let buf = std::sync::Arc::clone(&stdout_buf);
            tokio::spawn(async move {
                let mut tmp = [0u8; 4096];
                while let Ok(n) = pipe.read(&mut tmp).await {
                    if n == 0 {
                        break;
                    }
                    buf.lock().await.extend_from_slice(&tmp[..n]);
                }
            })
        });
        let stderr_task = stderr_pipe.take().map(|mut pipe| {
            let buf = std::sync::Arc::clone(&stderr_buf);
            tokio::spawn(async move {
                let mut tmp = [0u8; 4096];
                while let Ok(n) = pipe.read(&mut tmp).await {
                    if n == 0 {
                        break;
                    }
                    buf.lock().await.extend_from_slice(&tmp[..n]);
                }
            })
        });

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            _ = cancel.cancelled() => Outcome::Cancelled,
        };

        if let Some(task) = stdout_task {
            let _ = task.await;
        }
        if let Some(task) = stderr_task {
            let _ = task.await;
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let stdout = String::from_utf8_lossy(&stdout_buf.lock().await).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_buf.lock().await).into_owned();

        match outcome {
            Outcome::Exited(Ok(status)) => CommandResult {
                exit_code: status.code().unwrap_or(-1),
                stdout,
                stderr,
                duration_ms,
                timed_out: false,
            },
            Outcome::Exited(Err(err)) => CommandResult {
                exit_code: -1,
                stdout,
                stderr: format!("{stderr}\nfailed to wait for child: {err}"),
                duration_ms,
                timed_out: false,
            },
            Outcome::TimedOut => {
                drop(child);
                CommandResult::timeout(stdout, stderr, duration_ms)
            }
            Outcome::Cancelled => {
                drop(child);
                CommandResult {
                    exit_code: -1,
                    stdout,
                    stderr,
                    duration_ms,
                    timed_out: false,
                }
            }
        }
    }
}

impl Default for ShellExecutor {
    fn default() -> Self {
        Self::new()
    }
}

enum Outcome {
    Exited(std::io::Result<std::process::ExitStatus>),
    TimedOut,
    Cancelled,
}

fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let result = executor
            .execute(
                "echo hello",
                Path::new("/tmp"),
                Duration::from_secs(5),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
        assert!(!result.timed_out);
    }

    #[tokio::test]
    async fn nonzero_exit_is_captured() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let result = executor
            .execute(
                "exit 7",
                Path::new("/tmp"),
                Duration::from_secs(5),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.exit_code, 7);
    }

    #[tokio::test]
    async fn timeout_returns_partial_output_and_minus_one() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let result = executor
            .execute(
                "echo partial; sleep 5",
                Path::new("/tmp"),
                Duration::from_millis(200),
                &CancellationToken::new(),
            )
            .await;
        assert_eq!(result.exit_code, -1);
        assert!(result.timed_out);
        assert_eq!(result.stdout.trim(), "partial");
    }

    #[tokio::test]
    async fn cancellation_aborts_the_command() {
        let executor = ShellExecutor::with_shell("/bin/sh");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = executor
            .execute("sleep 5", Path::new("/tmp"), Duration::from_secs(5), &cancel)
            .await;
        assert_eq!(result.exit_code, -1);
    }
}
