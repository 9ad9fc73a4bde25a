//! An in-memory [`Model`] for tests of the orchestrator, error judge, and
//! summarizer, mirroring [`journeyman_fs::MockFileSystem`]'s role for the
//! filesystem trait.

use crate::error::NoEndpointsSnafu;
use crate::error::Result;
use crate::model::Model;
use crate::types::CompletionRequest;
use crate::types::CompletionResponse;
use crate::types::FinishReason;
use crate::types::StreamDelta;
use async_trait::async_trait;
use journeyman_protocol::TokenUsage;
use snafu::ensure;
use tokio::sync::mpsc;
use tokio::sync::Mutex;

/// Scripted response queue: each call to `complete`/`stream` pops the next
/// entry. Panics (via an error) once the queue is drained, so tests fail
/// loudly on an unexpected extra call.
pub struct MockModel {
    name: String,
    responses: Mutex<Vec<CompletionResponse>>,
}

impl MockModel {
    pub fn new(name: impl Into<String>, responses: Vec<CompletionResponse>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(responses),
        }
    }

    /// A model that always returns one fixed text response.
    pub fn always_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(
            name,
            vec![CompletionResponse {
                content: text.into(),
                tool_calls: Vec::new(),
                finish_reason: FinishReason::Stop,
                usage: TokenUsage::default(),
            }],
        )
    }
}

#[async_trait]
impl Model for MockModel {
    fn model_name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
        let mut responses = self.responses.lock().await;
        ensure!(
            !responses.is_empty(),
            NoEndpointsSnafu {
                model: self.name.clone(),
                message: "mock response queue exhausted",
            }
        );
        Ok(responses.remove(0))
    }

    async fn stream(&self, request: CompletionRequest) -> Result<mpsc::Receiver<StreamDelta>> {
        let response = self.complete(request).await?;
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

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_protocol::Message;

    #[tokio::test]
    async fn returns_queued_responses_in_order() {
        let model = MockModel::new(
            "mock",
            vec![
                CompletionResponse {
                    content: "first".to_string(),
                    tool_calls: Vec::new(),
                    finish_reason: FinishReason::Stop,
                    usage: TokenUsage::default(),
                },
                CompletionResponse {
                    content: "second".to_string(),
                    tool_calls: Vec::new(),
                    finish_reason: FinishReason::Stop,
                    usage: TokenUsage::default(),
                },
            ],
        );
        let request = CompletionRequest::new(vec![Message::user("hi")]);
        let first = model.complete(request.clone()).await.unwrap();
        assert_eq!(first.content, "first");
        let second = model.complete(request).await.unwrap();
        assert_eq!(second.content, "second");
    }

    #[tokio::test]
    async fn exhausted_queue_errors() {
        let model = MockModel::new("mock", Vec::new());
        let request = CompletionRequest::new(vec![Message::user("hi")]);
        assert!(model.complete(request).await.is_err());
    }

    #[tokio::test]
    async fn stream_emits_text_then_finished() {
        let model = MockModel::always_text("mock", "hello");
        let request = CompletionRequest::new(vec![Message::user("hi")]);
        let mut rx = model.stream(request).await.unwrap();
        let first = rx.recv().await.unwrap();
        assert!(matches!(first, StreamDelta::TextDelta(ref t) if t == "hello"));
        let second = rx.recv().await.unwrap();
        assert!(matches!(second, StreamDelta::Finished { .. }));
    }
}
