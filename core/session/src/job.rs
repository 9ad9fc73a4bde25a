//! Background job bookkeeping (spec §3 `Background job`). This is the
//! session's view of a job's identity/lifecycle; the owning process handle
//! lives exclusively in the `journeyman-shell` controller actor, never here.

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Shell,
    Sandbox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    StopRequested,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackgroundJob {
    pub id: String,
    pub command: String,
    pub kind: JobKind,
    pub pid: Option<u32>,
    pub pgid: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub status: JobStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_signal: Option<String>,
}

impl BackgroundJob {
    pub fn new(id: impl Into<String>, command: impl Into<String>, kind: JobKind) -> Self {
        Self {
            id: id.into(),
            command: command.into(),
            kind,
            pid: None,
            pgid: None,
            started_at: Utc::now(),
            status: JobStatus::Running,
            exit_code: None,
            last_signal: None,
        }
    }

    pub fn with_pid(mut self, pid: u32, pgid: u32) -> Self {
        self.pid = Some(pid);
        self.pgid = Some(pgid);
        self
    }

    pub fn request_stop(&mut self, signal: impl Into<String>) {
        if self.status != JobStatus::Completed {
            self.status = JobStatus::StopRequested;
            self.last_signal = Some(signal.into());
        }
    }

    /// Idempotent: completing an already-completed job is a no-op (spec §8).
    pub fn complete(&mut self, exit_code: i32) {
        if self.status == JobStatus::Completed {
            return;
        }
        self.status = JobStatus::Completed;
        self.exit_code = Some(exit_code);
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_is_idempotent() {
        let mut job = BackgroundJob::new("j1", "sleep 1", JobKind::Shell);
        job.complete(0);
        job.complete(137);
        assert_eq!(job.exit_code, Some(0));
    }

    #[test]
    fn stop_after_complete_is_noop() {
        let mut job = BackgroundJob::new("j1", "sleep 1", JobKind::Shell);
        job.complete(0);
        job.request_stop("TERM");
        assert_eq!(job.status, JobStatus::Completed);
        assert!(job.last_signal.is_none());
    }
}
