//! Background job controller (spec §4.6 "Background"): spawns a command in
//! a fresh process group, tracks combined line-buffered output, and exposes
//! list/snapshot/wait/signal against a job id. Completion is idempotent —
//! the done notification fires exactly once, and signaling an already
//! completed job is a no-op success (spec §8).

use crate::command::CommandResult;
use crate::port_probe::probe_listening_ports;
use crate::signal::signal_process;
use crate::signal::Signal;
use crate::JobNotFoundSnafu;
use crate::Result;
use journeyman_session::BackgroundJob;
use journeyman_session::JobKind;
use journeyman_session::SessionStore;
use snafu::ensure;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

struct RunningProcess {
    output: Arc<Mutex<Vec<u8>>>,
    done: Arc<Notify>,
    cancel: CancellationToken,
    pid: u32,
    pgid: Option<u32>,
}

#[derive(Clone, Default)]
pub struct BackgroundController {
    processes: Arc<Mutex<HashMap<String, RunningProcess>>>,
}

impl BackgroundController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns `command` in a fresh process group, registers a
    /// [`BackgroundJob`] in `store`, and returns its id.
    pub async fn spawn(&self, store: &SessionStore, command: &str, cwd: &Path) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut spawned = Command::new(default_shell());
        spawned
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            spawned.process_group(0);
        }

        let mut child = spawned
            .spawn()
            .map_err(|source| crate::error::ShellError::Spawn {
                command: command.to_string(),
                source,
            })?;
        let pid = child.id().unwrap_or(0);
        #[cfg(unix)]
        let pgid = Some(pid);
        #[cfg(not(unix))]
        let pgid = None;

        let job = BackgroundJob::new(id.clone(), command, JobKind::Shell).with_pid(pid, pgid.unwrap_or(pid));
        store
            .add_background_job(job)
            .await
            .map_err(|_| crate::error::ShellError::JobNotFound { id: id.clone() })?;

        let output = Arc::new(Mutex::new(Vec::<u8>::new()));
        let done = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        self.processes.lock().await.insert(
            id.clone(),
            RunningProcess {
                output: Arc::clone(&output),
                done: Arc::clone(&done),
                cancel: cancel.clone(),
                pid,
                pgid,
            },
        );

        let mut stdout = child.stdout.take();
        let mut stderr = child.stderr.take();
        let stdout_buf = Arc::clone(&output);
        let stderr_buf = Arc::clone(&output);

        let stdout_task = stdout.take().map(|mut pipe| {
            let buf = Arc::clone(&stdout_buf);
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
        let stderr_task = stderr.take().map(|mut pipe| {
            let buf = Arc::clone(&stderr_buf);
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

        let store = store.clone();
        let job_id = id.clone();
        let processes = Arc::clone(&self.processes);

        tokio::spawn(async move {
            let status = tokio::select! {
                status = child.wait() => status.ok(),
                _ = cancel.cancelled() => {
                    drop(child);
                    None
                }
            };

            if let Some(task) = stdout_task {
                let _ = task.await;
            }
            if let Some(task) = stderr_task {
                let _ = task.await;
            }

            let exit_code = status.and_then(|s| s.code()).unwrap_or(-1);
            let _ = store
                .update_background_job(&job_id, |job| job.complete(exit_code))
                .await;

            done.notify_waiters();
            processes.lock().await.remove(&job_id);
        });

        Ok(id)
    }

    pub async fn list(&self) -> Vec<String> {
        self.processes.lock().await.keys().cloned().collect()
    }

    /// Ports the job's process currently has bound, best effort.
    pub async fn listening_ports(&self, id: &str) -> Result<Vec<u16>> {
        let processes = self.processes.lock().await;
        let proc = processes.get(id).context_not_found(id)?;
        Ok(probe_listening_ports(proc.pid))
    }

    /// Returns the last `max_lines` lines of combined output.
    pub async fn snapshot(&self, id: &str, max_lines: usize) -> Result<String> {
        let processes = self.processes.lock().await;
        let proc = processes.get(id).context_not_found(id)?;
        let buf = proc.output.lock().await;
        let text = String::from_utf8_lossy(&buf);
        let lines: Vec<&str> = text.lines().collect();
        let start = lines.len().saturating_sub(max_lines);
        Ok(lines[start..].join("\n"))
    }

    /// Blocks until the job completes or `cancel` fires, then reports the
    /// exit code recorded in `store` so a `wait` and a subsequent `status`
    /// agree (spec §8).
    pub async fn wait(&self, store: &SessionStore, id: &str, cancel: &CancellationToken) -> Result<CommandResult> {
        let (done, output) = {
            let processes = self.processes.lock().await;
            let proc = processes.get(id).context_not_found(id)?;
            (Arc::clone(&proc.done), Arc::clone(&proc.output))
        };

        tokio::select! {
            _ = done.notified() => {}
            _ = cancel.cancelled() => {}
        }

        let text = String::from_utf8_lossy(&output.lock().await).into_owned();
        let exit_code = store.get_background_job(id).await.ok().and_then(|job| job.exit_code).unwrap_or(-1);
        Ok(CommandResult {
            exit_code,
            stdout: text,
            stderr: String::new(),
            duration_ms: 0,
            timed_out: false,
        })
    }

    /// Signals the job. Prefers the process group, falls back to the single
    /// process, falls back to cancelling the wait task directly. A job that
    /// has already completed (no longer tracked) is a no-op success.
    pub async fn signal(&self, store: &SessionStore, id: &str, signal: Signal) -> Result<()> {
        let processes = self.processes.lock().await;
        let Some(proc) = processes.get(id) else {
            return Ok(());
        };

        let delivered = signal_process(proc.pid, proc.pgid, signal);
        if !delivered {
            proc.cancel.cancel();
        }
        drop(processes);

        let _ = store
            .update_background_job(id, |job| job.request_stop(signal.as_str()))
            .await;
        Ok(())
    }
}

trait OptionNotFoundExt<T> {
    fn context_not_found(self, id: &str) -> Result<T>;
}

impl<T> OptionNotFoundExt<&T> for Option<&T> {
    fn context_not_found(self, id: &str) -> Result<&T> {
        self.ok_or_else(|| crate::error::ShellError::JobNotFound { id: id.to_string() })
    }
}

fn default_shell() -> String {
    std::env::var("SHELL").unwrap_or_else(|_| "/bin/sh".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_session::Session;

    #[tokio::test]
    async fn spawn_and_wait_records_exit_code() {
        let store = SessionStore::new(Session::new("/tmp"));
        let controller = BackgroundController::new();
        let id = controller
            .spawn(&store, "echo hi", Path::new("/tmp"))
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let result = controller.wait(&store, &id, &cancel).await.unwrap();
        let job = store.get_background_job(&id).await.unwrap();
        assert!(job.is_done());
        assert_eq!(job.exit_code, Some(0));
        assert_eq!(result.exit_code, 0);
    }

    #[tokio::test]
    async fn wait_reports_the_same_nonzero_exit_code_as_a_subsequent_status_check() {
        let store = SessionStore::new(Session::new("/tmp"));
        let controller = BackgroundController::new();
        let id = controller
            .spawn(&store, "exit 7", Path::new("/tmp"))
            .await
            .unwrap();
        let cancel = CancellationToken::new();
        let result = controller.wait(&store, &id, &cancel).await.unwrap();
        let job = store.get_background_job(&id).await.unwrap();
        assert_eq!(job.exit_code, Some(7));
        assert_eq!(result.exit_code, 7);
    }

    #[tokio::test]
    async fn signaling_an_unknown_job_is_a_noop_success() {
        let store = SessionStore::new(Session::new("/tmp"));
        let controller = BackgroundController::new();
        assert!(controller
            .signal(&store, "does-not-exist", Signal::Term)
            .await
            .is_ok());
    }
}
