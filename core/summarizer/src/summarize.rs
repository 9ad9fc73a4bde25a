//! Chunked map-reduce summarization (spec §4.10): one call when the input
//! fits comfortably in the target context window, otherwise an overlapping
//! per-chunk pass followed by a combining call, with a best-effort fallback
//! to the concatenated partial summaries if that final call fails.

use crate::chunker::chunk_text;
use crate::error::EmptyInputSnafu;
use crate::error::ModelSnafu;
use crate::error::Result;
use crate::types::NoopProgress;
use crate::types::ProgressCallback;
use crate::types::SummarizePhase;
use crate::types::SummarizerConfig;
use journeyman_inference::estimate_tokens_with_ratio;
use journeyman_inference::CompletionRequest;
use journeyman_inference::Model;
use journeyman_protocol::Message;
use snafu::ensure;
use snafu::ResultExt;

/// Summarizes `text` using `model`, reporting progress to `progress`.
///
/// `base_prompt` is the instruction given to the model (e.g. "Summarize the
/// following conversation, preserving decisions and pending work").
/// `context_hint`, if given, is prepended to every call as extra framing
/// (e.g. what the summary will be used for).
pub async fn summarize(
    model: &dyn Model,
    text: &str,
    base_prompt: &str,
    context_hint: Option<&str>,
    config: &SummarizerConfig,
) -> Result<String> {
    summarize_with_progress(model, text, base_prompt, context_hint, config, &NoopProgress).await
}

/// As [`summarize`], but reports [`SummarizePhase`] transitions to `progress`.
pub async fn summarize_with_progress(
    model: &dyn Model,
    text: &str,
    base_prompt: &str,
    context_hint: Option<&str>,
    config: &SummarizerConfig,
    progress: &dyn ProgressCallback,
) -> Result<String> {
    ensure!(!text.is_empty(), EmptyInputSnafu);
    let estimated_tokens = estimate_tokens_with_ratio(text, config.chars_per_token);
    let single_call_limit = (config.context_window as f64 * config.threshold) as u32;

    if estimated_tokens <= single_call_limit {
        progress.on_progress(&SummarizePhase::SingleCall);
        return call_model(model, base_prompt, context_hint, text).await;
    }

    let chunks = chunk_text(text, config.chunk_chars, config.overlap_chars);
    let total = chunks.len();
    let mut partials = Vec::with_capacity(total);

    for (index, chunk) in chunks.iter().enumerate() {
        progress.on_progress(&SummarizePhase::SummarizingChunk {
            index: index + 1,
            total,
        });
        let part_prompt = format!("{base_prompt}\n\n(Part {} of {total})", index + 1);
        let summary = call_model(model, &part_prompt, context_hint, chunk).await?;
        partials.push(summary);
    }

    progress.on_progress(&SummarizePhase::Combining { chunk_count: total });

    let combined_input = partials.join("\n\n---\n\n");
    let combine_prompt =
        format!("{base_prompt}\n\nCombine the following {total} partial summaries into one coherent summary.");

    match call_model(model, &combine_prompt, context_hint, &combined_input).await {
        Ok(summary) => Ok(summary),
        Err(_) => Ok(combined_input),
    }
}

async fn call_model(
    model: &dyn Model,
    base_prompt: &str,
    context_hint: Option<&str>,
    body: &str,
) -> Result<String> {
    let system = match context_hint {
        Some(hint) => format!("{base_prompt}\n\nContext: {hint}"),
        None => base_prompt.to_string(),
    };
    let messages = vec![Message::system(system), Message::user(body.to_string())];
    let response = model
        .complete(CompletionRequest::new(messages))
        .await
        .context(ModelSnafu)?;
    Ok(response.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_inference::CompletionResponse;
    use journeyman_inference::FinishReason;
    use journeyman_inference::MockModel;
    use journeyman_protocol::TokenUsage;

    fn response(text: &str) -> CompletionResponse {
        CompletionResponse {
            content: text.to_string(),
            tool_calls: Vec::new(),
            finish_reason: FinishReason::Stop,
            usage: TokenUsage::default(),
        }
    }

    #[tokio::test]
    async fn short_input_makes_a_single_call() {
        let model = MockModel::new("mock", vec![response("a short summary")]);
        let config = SummarizerConfig::default();
        let out = summarize(&model, "hello", "Summarize this", None, &config)
            .await
            .unwrap();
        assert_eq!(out, "a short summary");
    }

    #[tokio::test]
    async fn long_input_chunks_then_combines() {
        let config = SummarizerConfig {
            threshold: 0.0,
            context_window: 1,
            chunk_chars: 10,
            overlap_chars: 2,
            chars_per_token: 4,
        };
        let text = "x".repeat(35);
        let model = MockModel::new(
            "mock",
            vec![
                response("part1"),
                response("part2"),
                response("part3"),
                response("part4"),
                response("part5"),
                response("combined summary"),
            ],
        );
        let out = summarize(&model, &text, "Summarize", None, &config).await.unwrap();
        assert_eq!(out, "combined summary");
    }

    #[tokio::test]
    async fn failed_combine_falls_back_to_concatenated_partials() {
        let config = SummarizerConfig {
            threshold: 0.0,
            context_window: 1,
            chunk_chars: 10,
            overlap_chars: 2,
            chars_per_token: 4,
        };
        let text = "y".repeat(15);
        let model = MockModel::new("mock", vec![response("part1"), response("part2")]);
        let out = summarize(&model, &text, "Summarize", None, &config).await.unwrap();
        assert!(out.contains("part1"));
        assert!(out.contains("part2"));
    }
}
