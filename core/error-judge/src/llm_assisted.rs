//! The optional fast-model-assisted judge (spec §4.8): a cheap model is
//! given the structured facts of a failure and asked to reply in a strict
//! four-line format. Any malformed reply falls back to the heuristic judge.

use crate::decision::ErrorJudgeDecision;
use crate::heuristic::heuristic_judge;
use journeyman_error::StatusCode;
use journeyman_inference::CompletionRequest;
use journeyman_inference::Model;
use journeyman_protocol::Message;

const MIN_SLEEP_SECONDS: u64 = 1;
const MAX_SLEEP_SECONDS: u64 = 120;

const SYSTEM_PROMPT: &str = "You are an error-classification assistant for an LLM API client. \
Given a failed call's status and message, decide whether to retry it. \
Reply with EXACTLY four lines, nothing else:\n\
RETRY: yes|no\n\
SLEEP_SECONDS: <integer>\n\
TRIGGER_COMPACTION: yes|no\n\
REASON: <one short sentence>";

/// Asks `model` to classify the failure, falling back to
/// [`heuristic_judge`] if the reply doesn't parse or the model call itself
/// fails.
pub async fn llm_assisted_judge(
    model: &dyn Model,
    status: StatusCode,
    message: &str,
    attempt: u32,
    max_attempts: u32,
) -> ErrorJudgeDecision {
    if attempt >= max_attempts {
        return ErrorJudgeDecision::halt(format!("exhausted {max_attempts} attempts (last: {message})"));
    }

    let prompt = format!(
        "status: {status}\nmessage: {message}\nattempt: {attempt} of {max_attempts}",
        status = status.name(),
    );
    let request = CompletionRequest::new(vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]);

    let response = match model.complete(request).await {
        Ok(response) => response,
        Err(_) => return heuristic_judge(status, message, attempt, max_attempts),
    };

    parse_judge_reply(&response.content).unwrap_or_else(|| heuristic_judge(status, message, attempt, max_attempts))
}

fn parse_judge_reply(reply: &str) -> Option<ErrorJudgeDecision> {
    let mut should_retry = None;
    let mut sleep_seconds = None;
    let mut trigger_compaction = None;
    let mut reason = None;

    for line in reply.lines() {
        let line = line.trim();
        if let Some(value) = line.strip_prefix("RETRY:") {
            should_retry = Some(parse_yes_no(value.trim())?);
        } else if let Some(value) = line.strip_prefix("SLEEP_SECONDS:") {
            sleep_seconds = value.trim().parse::<u64>().ok();
        } else if let Some(value) = line.strip_prefix("TRIGGER_COMPACTION:") {
            trigger_compaction = Some(parse_yes_no(value.trim())?);
        } else if let Some(value) = line.strip_prefix("REASON:") {
            reason = Some(value.trim().to_string());
        }
    }

    let should_retry = should_retry?;
    let trigger_compaction = trigger_compaction?;
    let reason = reason?;

    if !should_retry {
        return Some(ErrorJudgeDecision::halt(reason));
    }

    let sleep_seconds = sleep_seconds.unwrap_or(MIN_SLEEP_SECONDS).clamp(MIN_SLEEP_SECONDS, MAX_SLEEP_SECONDS);

    Some(ErrorJudgeDecision {
        should_retry: true,
        sleep_seconds,
        trigger_compaction,
        reason,
    })
}

fn parse_yes_no(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journeyman_inference::MockModel;

    #[tokio::test]
    async fn well_formed_reply_drives_the_decision() {
        let model = MockModel::always_text(
            "judge",
            "RETRY: yes\nSLEEP_SECONDS: 7\nTRIGGER_COMPACTION: no\nREASON: transient network blip",
        );
        let decision = llm_assisted_judge(&model, StatusCode::NetworkError, "connection reset", 1, 6).await;
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 7);
        assert!(!decision.trigger_compaction);
    }

    #[tokio::test]
    async fn halt_reply_is_respected() {
        let model = MockModel::always_text(
            "judge",
            "RETRY: no\nSLEEP_SECONDS: 0\nTRIGGER_COMPACTION: no\nREASON: authentication is broken",
        );
        let decision = llm_assisted_judge(&model, StatusCode::AuthenticationFailed, "401", 1, 6).await;
        assert!(!decision.should_retry);
    }

    #[tokio::test]
    async fn sleep_seconds_is_clamped_to_the_valid_range() {
        let model = MockModel::always_text(
            "judge",
            "RETRY: yes\nSLEEP_SECONDS: 9000\nTRIGGER_COMPACTION: no\nREASON: be patient",
        );
        let decision = llm_assisted_judge(&model, StatusCode::RateLimited, "429", 1, 6).await;
        assert_eq!(decision.sleep_seconds, MAX_SLEEP_SECONDS);
    }

    #[tokio::test]
    async fn malformed_reply_falls_back_to_heuristic() {
        let model = MockModel::always_text("judge", "I am not sure what to do here.");
        let decision = llm_assisted_judge(&model, StatusCode::RateLimited, "429 too many requests", 2, 6).await;
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 10);
    }

    #[tokio::test]
    async fn attempt_at_max_always_halts_without_consulting_the_model() {
        let model = MockModel::always_text("judge", "RETRY: yes\nSLEEP_SECONDS: 1\nTRIGGER_COMPACTION: no\nREASON: x");
        let decision = llm_assisted_judge(&model, StatusCode::RateLimited, "429", 6, 6).await;
        assert!(!decision.should_retry);
    }
}
