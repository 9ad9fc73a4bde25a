//! The rule-table judge (spec §4.8), consulted first and as the fallback
//! for the optional LLM-assisted judge.

use crate::backoff::exponential_backoff_secs;
use crate::backoff::linear_backoff_secs;
use crate::decision::ErrorJudgeDecision;
use journeyman_error::StatusCode;

const RATE_LIMIT_BASE: u64 = 5;
const RATE_LIMIT_CAP: u64 = 60;
const SERVER_ERROR_BASE: u64 = 2;
const SERVER_ERROR_CAP: u64 = 30;
const NETWORK_BASE: u64 = 1;
const NETWORK_CAP: u64 = 5;
const CONTEXT_OVERFLOW_SLEEP: u64 = 1;
const UNKNOWN_RETRY_SLEEP: u64 = 3;
const UNKNOWN_RETRY_ATTEMPTS: u32 = 2;

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let lower = haystack.to_lowercase();
    needles.iter().any(|needle| lower.contains(needle))
}

/// Classifies a failed call per the spec's rule table. `message` is the
/// error's display text (some rules key on substrings the status code
/// alone can't distinguish, e.g. the "no endpoints found ... tool use"
/// phrasing).
pub fn heuristic_judge(status: StatusCode, message: &str, attempt: u32, max_attempts: u32) -> ErrorJudgeDecision {
    if attempt >= max_attempts {
        return ErrorJudgeDecision::halt(format!("exhausted {max_attempts} attempts (last: {message})"));
    }

    match status {
        StatusCode::RateLimited => {
            let sleep = exponential_backoff_secs(RATE_LIMIT_BASE, RATE_LIMIT_CAP, attempt);
            ErrorJudgeDecision::retry(sleep, "rate limited (429), exponential backoff")
        }
        StatusCode::ServiceUnavailable | StatusCode::Timeout => {
            let sleep = linear_backoff_secs(SERVER_ERROR_BASE, SERVER_ERROR_CAP, attempt);
            ErrorJudgeDecision::retry(sleep, "server error (500/503) or timeout, linear backoff")
        }
        StatusCode::NetworkError => {
            let sleep = linear_backoff_secs(NETWORK_BASE, NETWORK_CAP, attempt);
            ErrorJudgeDecision::retry(sleep, "connection/network error, short linear backoff")
        }
        StatusCode::ContextOverflow => {
            ErrorJudgeDecision::retry_with_compaction(CONTEXT_OVERFLOW_SLEEP, "context window exceeded, compacting before retry")
        }
        StatusCode::AuthenticationFailed => ErrorJudgeDecision::halt("authentication failed (401/invalid api key)"),
        StatusCode::NoEndpoints => {
            if contains_any(message, &["tool use", "tool_use", "tool call"]) {
                ErrorJudgeDecision::halt("no endpoints found that support tool use")
            } else {
                ErrorJudgeDecision::halt("no endpoints found for this model")
            }
        }
        StatusCode::ProviderError | StatusCode::StreamError => {
            if contains_any(message, &["400", "bad request", "invalid"]) {
                ErrorJudgeDecision::halt("bad request (400/invalid), not retryable")
            } else if contains_any(message, &["401", "auth", "invalid api key"]) {
                ErrorJudgeDecision::halt("authentication failed, not retryable")
            } else {
                unknown_judge(message, attempt)
            }
        }
        _ => unknown_judge(message, attempt),
    }
}

fn unknown_judge(message: &str, attempt: u32) -> ErrorJudgeDecision {
    if attempt <= UNKNOWN_RETRY_ATTEMPTS {
        ErrorJudgeDecision::retry(UNKNOWN_RETRY_SLEEP, format!("unrecognized error, retrying cautiously: {message}"))
    } else {
        ErrorJudgeDecision::halt(format!("unrecognized error persisted past {UNKNOWN_RETRY_ATTEMPTS} attempts: {message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_retries_with_exponential_backoff() {
        let decision = heuristic_judge(StatusCode::RateLimited, "429 too many requests", 2, 6);
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 10);
    }

    #[test]
    fn service_unavailable_retries_with_linear_backoff() {
        let decision = heuristic_judge(StatusCode::ServiceUnavailable, "503 service unavailable", 3, 6);
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 6);
    }

    #[test]
    fn network_error_retries_with_short_linear_backoff() {
        let decision = heuristic_judge(StatusCode::NetworkError, "connection reset", 2, 6);
        assert!(decision.should_retry);
        assert_eq!(decision.sleep_seconds, 2);
    }

    #[test]
    fn context_overflow_triggers_compaction() {
        let decision = heuristic_judge(StatusCode::ContextOverflow, "input too long", 1, 6);
        assert!(decision.should_retry);
        assert!(decision.trigger_compaction);
    }

    #[test]
    fn authentication_failure_halts() {
        let decision = heuristic_judge(StatusCode::AuthenticationFailed, "401 invalid api key", 1, 6);
        assert!(!decision.should_retry);
    }

    #[test]
    fn no_endpoints_for_tool_use_halts() {
        let decision = heuristic_judge(StatusCode::NoEndpoints, "no endpoints found that support tool use", 1, 6);
        assert!(!decision.should_retry);
    }

    #[test]
    fn bad_request_halts() {
        let decision = heuristic_judge(StatusCode::ProviderError, "400 bad request: invalid schema", 1, 6);
        assert!(!decision.should_retry);
    }

    #[test]
    fn unknown_error_retries_twice_then_halts() {
        let first = heuristic_judge(StatusCode::ProviderError, "something weird happened", 1, 6);
        assert!(first.should_retry);
        let second = heuristic_judge(StatusCode::ProviderError, "something weird happened", 2, 6);
        assert!(second.should_retry);
        let third = heuristic_judge(StatusCode::ProviderError, "something weird happened", 3, 6);
        assert!(!third.should_retry);
    }

    #[test]
    fn max_attempts_reached_always_halts() {
        let decision = heuristic_judge(StatusCode::RateLimited, "429", 6, 6);
        assert!(!decision.should_retry);
    }
}
