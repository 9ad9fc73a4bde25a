//! `Compacting` (spec §4.9): summarizes the older portion of history via
//! [`journeyman_summarizer`], replacing it with one system message while
//! keeping the most recent `keep_turns` user turns verbatim.
//!
//! The split point is always immediately before a `Message::User`: the
//! session-append invariant (`validate_message_sequence`) guarantees no
//! tool call is left unresolved across a user-message boundary, so summarized
//! history never strands a dangling tool id the tail still needs.

use crate::error::Result;
use crate::error::SummarizerSnafu;
use journeyman_inference::Model;
use journeyman_protocol::Message;
use journeyman_protocol::Role;
use journeyman_summarizer::summarize;
use journeyman_summarizer::SummarizerConfig;
use snafu::ResultExt;

const COMPACT_PROMPT: &str = "Summarize the following conversation history. Preserve: \
file paths that were read or modified, todo item ids and their status, decisions made, \
and any pending work the assistant still owes the user. Be concise but do not drop \
identifiers a later tool call might reference.";

/// Finds the index of the `keep_turns`-th-from-the-end user message, i.e.
/// the split point between "history to summarize" and "history to keep
/// verbatim". Returns 0 (keep everything) if there are fewer than
/// `keep_turns` user messages in `messages`.
fn split_point(messages: &[Message], keep_turns: usize) -> usize {
    if keep_turns == 0 {
        return messages.len();
    }
    let mut seen = 0;
    for (idx, msg) in messages.iter().enumerate().rev() {
        if matches!(msg.role, Role::User) {
            seen += 1;
            if seen == keep_turns {
                return idx;
            }
        }
    }
    0
}

/// Runs the compaction pass: summarizes `messages[..split]` and returns the
/// replacement history `[system_summary, messages[split..]]`. If the split
/// point is 0 (nothing old enough to summarize), returns `messages`
/// unchanged.
pub async fn compact(model: &dyn Model, messages: Vec<Message>, keep_turns: usize, config: &SummarizerConfig) -> Result<Vec<Message>> {
    let split = split_point(&messages, keep_turns);
    if split == 0 {
        return Ok(messages);
    }

    let (head, tail) = messages.split_at(split);
    let head_text = render_for_summary(head);
    let summary = summarize(model, &head_text, COMPACT_PROMPT, None, config)
        .await
        .context(SummarizerSnafu)?;

    let mut replacement = vec![Message::system(format!("[compacted history]\n{summary}"))];
    replacement.extend_from_slice(tail);
    Ok(replacement)
}

fn render_for_summary(messages: &[Message]) -> String {
    let mut out = String::new();
    for msg in messages {
        match msg.role {
            Role::System => out.push_str("[system] "),
            Role::User => out.push_str("[user] "),
            Role::Assistant => out.push_str("[assistant] "),
            Role::Tool => out.push_str(&format!("[tool:{}] ", msg.tool_name.as_deref().unwrap_or("?"))),
        }
        out.push_str(&msg.content);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_inference::MockModel;

    #[test]
    fn split_point_lands_on_a_user_message_boundary() {
        let messages = vec![
            Message::user("first"),
            Message::assistant("ok"),
            Message::user("second"),
            Message::assistant("ok"),
            Message::user("third"),
        ];
        let idx = split_point(&messages, 1);
        assert!(matches!(messages[idx].role, Role::User));
        assert_eq!(messages[idx].content, "third");
    }

    #[test]
    fn fewer_user_turns_than_keep_returns_zero() {
        let messages = vec![Message::user("only one")];
        assert_eq!(split_point(&messages, 5), 0);
    }

    #[tokio::test]
    async fn compacting_replaces_head_with_one_summary_message() {
        let messages = vec![
            Message::user("first"),
            Message::assistant("ok"),
            Message::user("second"),
        ];
        let model = MockModel::always_text("judge", "summary of the first turn");
        let config = SummarizerConfig::default();
        let out = compact(&model, messages, 1, &config).await.expect("compact");
        assert_eq!(out.len(), 2);
        assert!(matches!(out[0].role, Role::System));
        assert!(out[0].content.contains("summary of the first turn"));
        assert_eq!(out[1].content, "second");
    }

    #[tokio::test]
    async fn nothing_old_enough_leaves_history_untouched() {
        let messages = vec![Message::user("only one")];
        let model = MockModel::always_text("judge", "unused");
        let config = SummarizerConfig::default();
        let out = compact(&model, messages.clone(), 5, &config).await.expect("compact");
        assert_eq!(out.len(), messages.len());
    }
}
