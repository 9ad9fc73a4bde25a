//! Provider-quirk normalization hook (spec §4.9 supplement): a single seam
//! where a [`crate::Model`] implementation can rewrite the message history
//! immediately before it is sent, without the orchestrator knowing about
//! any particular provider's constraints.

use journeyman_protocol::Message;
use journeyman_protocol::Role;

/// Rewrites a message history to satisfy a provider's structural quirks.
/// Implementations should be pure and idempotent: calling it twice on an
/// already-normalized history must be a no-op.
pub trait NormalizeMessages: Send + Sync {
    fn normalize(&self, messages: Vec<Message>) -> Vec<Message>;
}

/// Merges consecutive same-role turns into one, which several chat-style
/// providers require (no two assistant or two user turns back to back).
/// Tool messages are never merged into one another or into adjacent turns,
/// since each carries a distinct `tool_id`.
pub struct MergeConsecutiveSameRole;

impl NormalizeMessages for MergeConsecutiveSameRole {
    fn normalize(&self, messages: Vec<Message>) -> Vec<Message> {
        let mut out: Vec<Message> = Vec::with_capacity(messages.len());
        for msg in messages {
            let mergeable = matches!(msg.role, Role::User | Role::Assistant) && msg.tool_calls.is_none();
            if mergeable {
                if let Some(prev) = out.last_mut() {
                    if prev.role == msg.role && prev.tool_calls.is_none() {
                        if !prev.content.is_empty() && !msg.content.is_empty() {
                            prev.content.push('\n');
                        }
                        prev.content.push_str(&msg.content);
                        continue;
                    }
                }
            }
            out.push(msg);
        }
        out
    }
}

/// Applies no transformation; the default for providers with no known quirks.
pub struct IdentityNormalizer;

impl NormalizeMessages for IdentityNormalizer {
    fn normalize(&self, messages: Vec<Message>) -> Vec<Message> {
        messages
    }
}
