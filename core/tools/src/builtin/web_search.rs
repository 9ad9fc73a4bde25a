//! `web_search` (spec §4.5): searches the web via DuckDuckGo's HTML
//! endpoint (no API key required) and returns citation-numbered markdown
//! results. Disabled unless the workspace's search config opts in.

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

const SEARCH_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MAX_RESULTS: usize = 5;

struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

pub struct WebSearchTool {
    enabled: bool,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
                .user_agent("journeyman-web-search/1.0")
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for WebSearchTool {
    fn default() -> Self {
        Self::new(false)
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Searches the web and returns citation-numbered results with titles, snippets, and source URLs."
    }

    fn authorization_tier(&self) -> AuthorizationTier {
        AuthorizationTier::Sensitive
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {"type": "string", "minLength": 2},
                "max_results": {"type": "integer", "minimum": 1, "maximum": 20}
            },
            "required": ["query"]
        })
    }

    async fn check_permission(&self, input: &Value, _ctx: &ToolContext) -> PermissionResult {
        if !self.enabled {
            return PermissionResult::Denied {
                reason: "web_search is disabled for this workspace (config.search.enabled = false)".to_string(),
            };
        }
        let query = input.get("query").and_then(Value::as_str).unwrap_or_default();
        PermissionResult::NeedsApproval {
            request: ApprovalRequest {
                request_id: format!("web_search-{}", query.len()),
                tool_name: self.name().to_string(),
                description: format!("Web search: {query}"),
                risks: Vec::new(),
                allow_remember: true,
                proposed_prefix_pattern: None,
            },
        }
    }

    async fn execute(&self, input: Value, ctx: &mut ToolContext) -> Result<ToolOutput, ToolError> {
        let query = input["query"].as_str().ok_or_else(|| ToolError::invalid_input("query must be a string"))?.trim();
        if query.len() < 2 {
            return Err(ToolError::invalid_input("query must be at least 2 characters"));
        }
        let max_results = input
            .get("max_results")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .clamp(1, 20);

        ctx.emit_progress(format!("searching: {query}")).await;

        let url = format!("https://html.duckduckgo.com/html/?q={}", urlencoding::encode(query));
        let response = match self.client.get(&url).header("Accept", "text/html").send().await {
            Ok(resp) => resp,
            Err(err) if err.is_timeout() => return Ok(ToolOutput::error("search timed out")),
            Err(err) => return Ok(ToolOutput::error(format!("network error: {err}"))),
        };

        if !response.status().is_success() {
            return Ok(ToolOutput::error(format!("search provider returned status {}", response.status())));
        }

        let html = response.text().await.map_err(|err| ToolError::Network { message: err.to_string() })?;
        let results = parse_duckduckgo_html(&html, max_results);

        Ok(ToolOutput::text(format_results(query, &results)))
    }
}

#[allow(clippy::expect_used)]
fn parse_duckduckgo_html(html: &str, max_results: usize) -> Vec<SearchResult> {
    let link_re = regex_lite::Regex::new(r#"class="result__a"[^>]*href="([^"]+)"[^>]*>([^<]+)</a>"#)
        .expect("result link pattern is a fixed valid regex");
    let snippet_re =
        regex_lite::Regex::new(r#"class="result__snippet"[^>]*>([^<]+)"#).expect("snippet pattern is a fixed valid regex");

    let links: Vec<(String, String)> = link_re
        .captures_iter(html)
        .filter_map(|cap| {
            let url = decode_duckduckgo_url(&cap[1]);
            let title = decode_html_entities(&cap[2]);
            if url.is_empty() || title.is_empty() {
                None
            } else {
                Some((url, title))
            }
        })
        .collect();

    let snippets: Vec<String> = snippet_re.captures_iter(html).map(|cap| decode_html_entities(&cap[1])).collect();

    links
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(idx, (url, title))| SearchResult {
            title,
            url,
            snippet: snippets.get(idx).cloned().unwrap_or_default(),
        })
        .collect()
}

fn decode_duckduckgo_url(encoded: &str) -> String {
    match encoded.find("uddg=") {
        Some(start) => {
            let rest = &encoded[start + 5..];
            let raw = rest.split('&').next().unwrap_or(rest);
            percent_decode(raw)
        }
        None => encoded.to_string(),
    }
}

fn percent_decode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() == 2 {
                if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                    result.push(byte as char);
                    continue;
                }
            }
            result.push('%');
            result.push_str(&hex);
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }
    result
}

fn decode_html_entities(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn format_results(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return format!("no results found for \"{query}\"");
    }
    let mut out = format!("web search results for \"{query}\":\n\n");
    for (idx, result) in results.iter().enumerate() {
        out.push_str(&format!("[{}] {}\n{}\nSource: {}\n\n", idx + 1, result.title, result.snippet.trim(), result.url));
    }
    out
}
