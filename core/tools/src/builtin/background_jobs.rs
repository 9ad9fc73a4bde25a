//! `status_program` / `wait_program` / `stop_program` (spec §4.5, §4.6):
//! query, block on, and terminate background jobs by id.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::ToolOutput;
use journeyman_shell::Signal;
use serde_json::Value;

const DEFAULT_SNAPSHOT_LINES: usize = 100;

pub struct StatusProgramTool;

impl StatusProgramTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StatusProgramTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for StatusProgramTool {
    fn name(&self) -> &str {
        "status_program"
    }

    fn description(&self) -> &str {
        "Reports a background job's status, recent output, and listening ports, by job id."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "job_id": {"type": "string"},
                "lines": {"type": "integer", "description": "number of trailing output lines, default 100"}
            },
            "required": ["job_id"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let job_id = input["job_id"].as_str().ok_or_else(|| ToolError::invalid_input("job_id must be a string"))?;
        let lines = input.get("lines").and_then(Value::as_u64).unwrap_or(DEFAULT_SNAPSHOT_LINES as u64) as usize;

        let job = ctx.session.get_background_job(job_id).await.map_err(|source| ToolError::Session { source })?;
        let snapshot = ctx.background.snapshot(job_id, lines).await.unwrap_or_default();
        let ports = ctx.background.listening_ports(job_id).await.unwrap_or_default();

        Ok(ToolOutput::structured(serde_json::json!({
            "job_id": job_id,
            "command": job.command,
            "status": job.status,
            "exit_code": job.exit_code,
            "listening_ports": ports,
            "output": snapshot,
        })))
    }
}

pub struct WaitProgramTool;

impl WaitProgramTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WaitProgramTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for WaitProgramTool {
    fn name(&self) -> &str {
        "wait_program"
    }

    fn description(&self) -> &str {
        "Blocks until a background job completes or the call is cancelled, then returns its result."
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "job_id": {"type": "string"}
            },
            "required": ["job_id"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let job_id = input["job_id"].as_str().ok_or_else(|| ToolError::invalid_input("job_id must be a string"))?;
        let result = ctx
            .background
            .wait(&ctx.session, job_id, &ctx.cancel_token)
            .await
            .map_err(|source| ToolError::Shell { source })?;

        Ok(ToolOutput::structured(serde_json::json!({
            "job_id": job_id,
            "exit_code": result.exit_code,
            "stdout": result.stdout,
            "stderr": result.stderr,
        })))
    }
}

pub struct StopProgramTool;

impl StopProgramTool {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StopProgramTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for StopProgramTool {
    fn name(&self) -> &str {
        "stop_program"
    }

    fn description(&self) -> &str {
        "Signals a background job to stop (TERM by default, KILL if force is set). A no-op success if the job already finished."
    }

    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Elevated
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "job_id": {"type": "string"},
                "force": {"type": "boolean", "description": "send KILL instead of TERM"}
            },
            "required": ["job_id"]
        })
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let job_id = input["job_id"].as_str().ok_or_else(|| ToolError::invalid_input("job_id must be a string"))?;
        let force = input.get("force").and_then(Value::as_bool).unwrap_or(false);
        let signal = if force { Signal::Kill } else { Signal::Term };

        ctx.background
            .signal(&ctx.session, job_id, signal)
            .await
            .map_err(|source| ToolError::Shell { source })?;

        Ok(ToolOutput::text(format!("signaled {job_id} with {}", signal.as_str())))
    }
}
