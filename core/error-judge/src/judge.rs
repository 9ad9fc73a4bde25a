//! [`ErrorJudge`]: the single entry point the orchestrator's `JudgingError`
//! state (spec §4.9) consults after a failed `CallingLLM`/`Streaming` turn.

use crate::decision::ErrorJudgeDecision;
use crate::heuristic::heuristic_judge;
use crate::llm_assisted::llm_assisted_judge;
use journeyman_error::StatusCode;
use journeyman_inference::Model;
use std::sync::Arc;

/// Classifies a failed LLM call and decides whether/how to retry.
///
/// Always falls back to [`heuristic_judge`]; a fast `judge_model` upgrades
/// the classification to the optional LLM-assisted path (spec §4.8).
pub struct ErrorJudge {
    judge_model: Option<Arc<dyn Model>>,
    max_attempts: u32,
}

impl ErrorJudge {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            judge_model: None,
            max_attempts,
        }
    }

    pub fn with_judge_model(mut self, model: Arc<dyn Model>) -> Self {
        self.judge_model = Some(model);
        self
    }

    /// Classifies the `attempt`-th failure (1-indexed) carrying `status`
    /// and `message`.
    pub async fn judge(&self, status: StatusCode, message: &str, attempt: u32) -> ErrorJudgeDecision {
        match &self.judge_model {
            Some(model) => llm_assisted_judge(model.as_ref(), status, message, attempt, self.max_attempts).await,
            None => heuristic_judge(status, message, attempt, self.max_attempts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn without_a_judge_model_falls_back_to_heuristic() {
        let judge = ErrorJudge::new(6);
        let decision = judge.judge(StatusCode::RateLimited, "429", 2).await;
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 10);
    }

    #[tokio::test]
    async fn with_a_judge_model_uses_the_llm_assisted_path() {
        use journeyman_inference::MockModel;

        let model = Arc::new(MockModel::always_text(
            "judge",
            "RETRY: yes\nSLEEP_SECONDS: 3\nTRIGGER_COMPACTION: no\nREASON: flaky provider",
        ));
        let judge = ErrorJudge::new(6).with_judge_model(model);
        let decision = judge.judge(StatusCode::ServiceUnavailable, "503", 1).await;
        assert_eq!(decision.sleep_seconds, 3);
    }

    #[tokio::test]
    async fn reaching_max_attempts_forces_halt_even_with_a_judge_model() {
        use journeyman_inference::MockModel;

        let model = Arc::new(MockModel::always_text(
            "judge",
            "RETRY: yes\nSLEEP_SECONDS: 3\nTRIGGER_COMPACTION: no\nREASON: keep going",
        ));
        let judge = ErrorJudge::new(3).with_judge_model(model);
        let decision = judge.judge(StatusCode::RateLimited, "429", 3).await;
        assert!(!decision.should_retry);
    }
}
