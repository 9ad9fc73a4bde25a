//! The [`Model`] capability trait: the single seam the orchestrator drives
//! against, regardless of which provider backs a given role (spec §4.9
//! "CallingLLM"/"Streaming").

use crate::error::Result;
use crate::estimate_tokens_default;
use crate::types::CompletionRequest;
use crate::types::CompletionResponse;
use crate::types::StreamDelta;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A chat-completion-capable model, streaming or not.
///
/// Implementations normalize provider-specific quirks (message ordering
/// constraints, tool-call encoding) internally; callers only see the shapes
/// in [`crate::types`].
#[async_trait]
pub trait Model: Send + Sync {
    /// The model identifier as configured (e.g. `"anthropic/claude-sonnet"`).
    fn model_name(&self) -> &str;

    /// Non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Streaming completion. Deltas arrive on the returned channel; the
    /// channel closes after a [`StreamDelta::Finished`] or an error is
    /// returned from the driving task.
    async fn stream(&self, request: CompletionRequest) -> Result<mpsc::Receiver<StreamDelta>>;

    /// Convenience: drains a tool-calling completion without the caller
    /// needing to branch on streaming vs non-streaming.
    async fn complete_with_tool_calls(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        self.complete(request).await
    }

    /// Rough token estimate for `text` under this model's tokenizer.
    /// Default falls back to the chars-per-token heuristic (spec §4.10).
    fn estimate_tokens(&self, text: &str) -> u32 {
        estimate_tokens_default(text)
    }
}
