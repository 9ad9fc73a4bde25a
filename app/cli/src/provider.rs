//! A generic OpenAI-chat-completions-compatible [`Model`] (spec §4.9): the
//! one concrete provider adapter this binary ships, since the core crates
//! only depend on the [`Model`] trait (spec §1 scope). Grounded on
//! `journeyman_config::McpServerKind::OpenaiLike`'s shape: model, api key,
//! base URL, system prompt, temperature, max output tokens, JSON mode.

use async_trait::async_trait;
use journeyman_inference::CompletionRequest;
use journeyman_inference::CompletionResponse;
use journeyman_inference::FinishReason;
use journeyman_inference::InferenceError;
use journeyman_inference::Model;
use journeyman_inference::Result;
use journeyman_inference::StreamDelta;
use journeyman_protocol::Role;
use journeyman_protocol::TokenUsage;
use journeyman_protocol::ToolCall;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const REQUEST_TIMEOUT_SECS: u64 = 120;

pub struct OpenAiCompatibleModel {
    model: String,
    api_key: String,
    base_url: String,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    json_mode: bool,
    client: reqwest::Client,
}

impl OpenAiCompatibleModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            system_prompt: None,
            temperature: None,
            json_mode: false,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_json_mode(mut self, json_mode: bool) -> Self {
        self.json_mode = json_mode;
        self
    }

    async fn do_complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let mut messages = Vec::new();
        if let Some(prompt) = &self.system_prompt {
            messages.push(WireMessage::system(prompt));
        }
        messages.extend(request.messages.iter().map(WireMessage::from_protocol));

        let tools: Vec<WireTool> = request.tools.iter().map(WireTool::from_definition).collect();

        let body = WireRequest {
            model: self.model.clone(),
            messages,
            tools: if tools.is_empty() { None } else { Some(tools) },
            temperature: request.temperature.or(self.temperature),
            max_tokens: request.max_tokens,
            response_format: self.json_mode.then(|| ResponseFormat { format_type: "json_object".to_string() }),
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), text));
        }

        let wire: WireResponse = response.json().await.map_err(network_error)?;
        wire.into_completion()
    }
}

#[async_trait]
impl Model for OpenAiCompatibleModel {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.do_complete(request).await
    }

    /// No server-sent-events support here: drains the non-streaming call
    /// and replays it as a single text delta plus tool-call deltas,
    /// mirroring `journeyman_inference::MockModel::stream`.
    async fn stream(&self, request: CompletionRequest) -> Result<mpsc::Receiver<StreamDelta>> {
        let response = self.do_complete(request).await?;
        let (tx, rx) = mpsc::channel(8);
        if !response.content.is_empty() {
            let _ = tx.send(StreamDelta::TextDelta(response.content.clone())).await;
        }
        for call in response.tool_calls.clone() {
            let _ = tx.send(StreamDelta::ToolCallDelta(call)).await;
        }
        let _ = tx
            .send(StreamDelta::Finished {
                finish_reason: response.finish_reason,
                usage: response.usage,
            })
            .await;
        Ok(rx)
    }
}

fn network_error(err: reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout { seconds: REQUEST_TIMEOUT_SECS }
    } else {
        InferenceError::Network { message: err.to_string() }
    }
}

fn status_to_error(status: u16, body: String) -> InferenceError {
    match status {
        401 | 403 => InferenceError::AuthenticationFailed { message: body },
        429 => InferenceError::RateLimited { message: body },
        500..=599 => InferenceError::ServiceUnavailable { message: body },
        _ => InferenceError::Provider { message: format!("http {status}: {body}") },
    }
}

#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "max_tokens")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: Some(content.to_string()),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    fn from_protocol(message: &journeyman_protocol::Message) -> Self {
        match message.role {
            Role::System => Self {
                role: "system",
                content: Some(message.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Role::User => Self {
                role: "user",
                content: Some(message.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            },
            Role::Assistant => Self {
                role: "assistant",
                content: if message.content.is_empty() { None } else { Some(message.content.clone()) },
                tool_calls: message.tool_calls.as_ref().map(|calls| calls.iter().map(WireToolCall::from_call).collect()),
                tool_call_id: None,
            },
            Role::Tool => Self {
                role: "tool",
                content: Some(message.content.clone()),
                tool_calls: None,
                tool_call_id: message.tool_id.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    call_type: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl WireToolCall {
    fn from_call(call: &ToolCall) -> Self {
        Self {
            id: call.id.clone(),
            call_type: "function".to_string(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_string(),
            },
        }
    }

    fn into_call(self) -> ToolCall {
        let arguments: Value = serde_json::from_str(&self.function.arguments).unwrap_or(Value::Null);
        ToolCall::new(self.id, self.function.name, arguments)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: WireToolFunction,
}

#[derive(Debug, Serialize)]
struct WireToolFunction {
    name: String,
    description: Option<String>,
    parameters: Value,
}

impl WireTool {
    fn from_definition(def: &journeyman_protocol::ToolDefinition) -> Self {
        Self {
            tool_type: "function",
            function: WireToolFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.input_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl WireResponse {
    fn into_completion(self) -> Result<CompletionResponse> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::Provider { message: "response carried no choices".to_string() })?;

        let finish_reason = match choice.finish_reason.as_deref() {
            Some("tool_calls") => FinishReason::ToolCalls,
            Some("length") => FinishReason::Length,
            Some("content_filter") => FinishReason::ContentFilter,
            _ => FinishReason::Stop,
        };

        let tool_calls: Vec<ToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(WireToolCall::into_call)
            .collect();

        let finish_reason = if !tool_calls.is_empty() { FinishReason::ToolCalls } else { finish_reason };

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason,
            usage: self
                .usage
                .map(|u| TokenUsage {
                    input_tokens: u.prompt_tokens as u64,
                    output_tokens: u.completion_tokens as u64,
                    cached_input_tokens: 0,
                })
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_response_with_no_choices_is_a_provider_error() {
        let wire = WireResponse { choices: Vec::new(), usage: None };
        assert!(wire.into_completion().is_err());
    }

    #[test]
    fn wire_response_with_tool_calls_forces_tool_calls_finish_reason() {
        let wire = WireResponse {
            choices: vec![WireChoice {
                message: WireChoiceMessage {
                    content: None,
                    tool_calls: Some(vec![WireToolCall {
                        id: "call_1".to_string(),
                        call_type: "function".to_string(),
                        function: WireFunctionCall {
                            name: "read_file".to_string(),
                            arguments: "{\"path\":\"a.rs\"}".to_string(),
                        },
                    }]),
                },
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        };
        let completion = wire.into_completion().expect("completion");
        assert_eq!(completion.finish_reason, FinishReason::ToolCalls);
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].name, "read_file");
    }

    #[test]
    fn system_prompt_is_prepended_as_a_system_message() {
        let message = WireMessage::system("be terse");
        assert_eq!(message.role, "system");
        assert_eq!(message.content.as_deref(), Some("be terse"));
    }
}
