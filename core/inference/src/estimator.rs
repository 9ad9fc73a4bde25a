//! Default token estimator shared by models that don't ship their own
//! tokenizer (spec §4.10: "chars/4" as the default heuristic).

const DEFAULT_CHARS_PER_TOKEN: usize = 4;

/// Estimates token count for `text` using the default chars-per-token ratio.
/// Used as a [`crate::Model::estimate_tokens`] fallback and by the
/// summarizer's chunking pass.
pub fn estimate_tokens_default(text: &str) -> u32 {
    estimate_tokens_with_ratio(text, DEFAULT_CHARS_PER_TOKEN)
}

/// Same as [`estimate_tokens_default`] but with a caller-supplied ratio,
/// so the summarizer can honor `compaction.chars_per_token` config.
pub fn estimate_tokens_with_ratio(text: &str, chars_per_token: usize) -> u32 {
    let chars_per_token = chars_per_token.max(1);
    let chars = text.chars().count();
    (chars.div_ceil(chars_per_token)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_zero_tokens() {
        assert_eq!(estimate_tokens_default(""), 0);
    }

    #[test]
    fn rounds_up_to_the_next_token() {
        assert_eq!(estimate_tokens_with_ratio("abcde", 4), 2);
        assert_eq!(estimate_tokens_with_ratio("abcd", 4), 1);
    }
}
