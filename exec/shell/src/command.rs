//! Result of a single foreground command execution (spec §4.6 "Foreground").

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// −1 for non-exit error conditions (timeout, spawn failure).
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub timed_out: bool,
}

impl CommandResult {
    pub fn timeout(partial_stdout: String, partial_stderr: String, duration_ms: u64) -> Self {
        Self {
            exit_code: -1,
            stdout: partial_stdout,
            stderr: partial_stderr,
            duration_ms,
            timed_out: true,
        }
    }

    pub fn spawn_failed(message: String) -> Self {
        Self {
            exit_code: -1,
            stdout: String::new(),
            stderr: message,
            duration_ms: 0,
            timed_out: false,
        }
    }
}
