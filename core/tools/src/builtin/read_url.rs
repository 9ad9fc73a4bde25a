//! `read_url` (spec §4.5): fetches a URL and returns its text content,
//! gated by a domain allowlist (spec §6 `WorkspacePolicy.domain_allowlist`).
//! HTML is converted to plain text; non-HTML bodies are returned as-is.

use crate::context::ToolContext;
use crate::error::ToolError;
use crate::tool::Tool;
use async_trait::async_trait;
use journeyman_protocol::ApprovalRequest;
use journeyman_protocol::AuthorizationTier;
use journeyman_protocol::PermissionResult;
use journeyman_protocol::ToolOutput;
use serde_json::Value;
use std::time::Duration;

const MAX_CONTENT_CHARS: usize = 100_000;
const FETCH_TIMEOUT_SECS: u64 = 30;

/// Hosts pre-approved for `read_url` regardless of a workspace's
/// configured allowlist - documentation sites with no sensitive content.
const PREAPPROVED_HOSTS: &[&str] = &[
    "docs.rs",
    "crates.io",
    "doc.rust-lang.org",
    "developer.mozilla.org",
    "en.wikipedia.org",
    "github.com",
    "raw.githubusercontent.com",
];

pub struct ReadUrlTool {
    allowed_domains: Vec<String>,
    client: reqwest::Client,
}

impl ReadUrlTool {
    pub fn new(allowed_domains: Vec<String>) -> Self {
        Self {
            allowed_domains,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
                .user_agent("journeyman-read-url/1.0")
                .build()
                .unwrap_or_default(),
        }
    }

    fn hostname_allowed(&self, hostname: &str) -> bool {
        PREAPPROVED_HOSTS.iter().any(|h| hostname == *h || hostname.ends_with(&format!(".{h}")))
            || self.allowed_domains.iter().any(|d| hostname == d || hostname.ends_with(&format!(".{d}")))
    }
}

impl Default for ReadUrlTool {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn hostname_of(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .and_then(|rest| rest.split('/').next())
        .unwrap_or(url)
}

#[async_trait]
impl Tool for ReadUrlTool {
    fn name(&self) -> &str {
        "read_url"
    }

    fn description(&self) -> &str {
        "Fetches a URL and returns its text content. Gated by a domain allowlist; HTML is converted to plain text."
    }

    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Sensitive
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {"type": "string", "format": "uri"}
            },
            "required": ["url"]
        })
    }

    async fn check_permission(&self, input: &Value, _ctx: &ToolContext) -> PermissionResult {
        let Some(url) = input.get("url").and_then(Value::as_str) else {
            return PermissionResult::Allowed;
        };
        let hostname = hostname_of(url);
        if self.hostname_allowed(hostname) {
            return PermissionResult::Allowed;
        }
        PermissionResult::NeedsApproval {
            request: ApprovalRequest {
                request_id: format!("read_url-{hostname}"),
                tool_name: self.name().to_string(),
                description: format!("Fetch URL: {url}"),
                risks: Vec::new(),
                allow_remember: true,
                proposed_prefix_pattern: Some(hostname.to_string()),
            },
        }
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let url = input["url"].as_str().ok_or_else(|| ToolError::invalid_input("url must be a string"))?;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::invalid_input("url must start with http:// or https://"));
        }

        ctx.emit_progress(format!("fetching {url}")).await;

        let response = match self.client.get(url).send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => {
                return Ok(ToolOutput::error(format!("timed out fetching {url}")));
            }
            Err(err) => return Ok(ToolOutput::error(format!("network error fetching {url}: {err}"))),
        };

        let status = response.status();
        if !status.is_success() {
            return Ok(ToolOutput::error(format!("{url} returned status {status}")));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        let body = response.text().await.map_err(|err| ToolError::Network { message: err.to_string() })?;

        let text = if content_type.contains("text/html") || content_type.is_empty() {
            html2text::from_read(body.as_bytes(), 120).unwrap_or(body)
        } else {
            body
        };

        let truncated = if text.len() > MAX_CONTENT_CHARS {
            let mut boundary = MAX_CONTENT_CHARS;
            while boundary > 0 && !text.is_char_boundary(boundary) {
                boundary -= 1;
            }
            format!("{}\n\n[truncated: {} of {} bytes shown]", &text[..boundary], boundary, text.len())
        } else {
            text
        };

        Ok(ToolOutput::text(truncated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preapproved_hosts_need_no_approval() {
        let tool = ReadUrlTool::default();
        assert!(tool.hostname_allowed("docs.rs"));
        assert!(tool.hostname_allowed("doc.rust-lang.org"));
    }

    #[test]
    fn configured_domain_and_subdomains_are_allowed() {
        let tool = ReadUrlTool::new(vec!["example.com".to_string()]);
        assert!(tool.hostname_allowed("example.com"));
        assert!(tool.hostname_allowed("api.example.com"));
        assert!(!tool.hostname_allowed("evil.com"));
    }

    #[tokio::test]
    async fn unapproved_host_needs_approval() {
        use journeyman_fs::MockFileSystem;
        use journeyman_session::Session;
        use journeyman_session::SessionStore;
        use journeyman_shell::BackgroundController;
        use journeyman_shell::ShellExecutor;
        use std::sync::Arc;

        let ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        );
        let tool = ReadUrlTool::default();
        let result = tool.check_permission(&serde_json::json!({"url": "https://evil.example/page"}), &ctx).await;
        assert!(matches!(result, PermissionResult::NeedsApproval { .. }));
    }

    #[tokio::test]
    async fn rejects_non_http_schemes() {
        use journeyman_fs::MockFileSystem;
        use journeyman_session::Session;
        use journeyman_session::SessionStore;
        use journeyman_shell::BackgroundController;
        use journeyman_shell::ShellExecutor;
        use std::sync::Arc;

        let mut ctx = ToolContext::new(
            "call-1",
            "session-1",
            "/tmp",
            SessionStore::new(Session::new("/tmp")),
            Arc::new(MockFileSystem::new()),
            ShellExecutor::new(),
            BackgroundController::new(),
        );
        let result = ReadUrlTool::default()
            .execute(serde_json::json!({"url": "ftp://example.com/file"}), &mut ctx)
            .await;
        assert!(matches!(result, Err(ToolError::InvalidInput { .. })));
    }
}
