//! The `ask_user` round-trip (spec §4.5, §4.9's "free-form questions"
//! interactive callback). Mirrors [`journeyman_safety::Authorizer`]'s
//! shape: an async trait the frontend implements, plus a headless
//! default for non-interactive contexts.

use async_trait::async_trait;
use std::time::Duration;

/// Poses a free-form question to whatever frontend is driving the
/// session and returns its answer. The orchestrator pauses the LLM loop
/// while this future is pending, same as [`journeyman_safety::Authorizer`].
#[async_trait]
pub trait UserAsker: Send + Sync {
    async fn ask(&self, question: &str) -> String;
}

/// An asker that waits briefly then reports no answer is available -
/// models headless/non-interactive contexts where there is no frontend
/// to ask.
pub struct UnattendedAsker {
    pub timeout: Duration,
}

impl Default for UnattendedAsker {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(0),
        }
    }
}

#[async_trait]
impl UserAsker for UnattendedAsker {
    async fn ask(&self, _question: &str) -> String {
        if !self.timeout.is_zero() {
            tokio::time::sleep(self.timeout).await;
        }
        "no answer available: running without an interactive frontend".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unattended_asker_reports_no_answer() {
        let asker = UnattendedAsker::default();
        let answer = asker.ask("which port?").await;
        assert!(answer.contains("no answer"));
    }
}
