//! Configuration and progress-reporting types for the summarizer (spec §4.10).

/// Tunables for chunked map-reduce summarization.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Fraction of `context_window` above which the input is split into
    /// chunks rather than summarized with a single call.
    pub threshold: f64,
    /// The target model's context window, in tokens.
    pub context_window: u32,
    /// Target size of each chunk, in characters.
    pub chunk_chars: usize,
    /// Overlap between consecutive chunks, in characters, so a chunk
    /// boundary never silently drops context that spans it.
    pub overlap_chars: usize,
    /// Characters-per-token ratio used by the default token estimator.
    pub chars_per_token: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            context_window: 128_000,
            chunk_chars: 12_000,
            overlap_chars: 500,
            chars_per_token: 4,
        }
    }
}

/// Phase of an in-progress summarization, reported to a [`ProgressCallback`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarizePhase {
    /// Input fits within the single-call threshold.
    SingleCall,
    /// Summarizing chunk `index` (1-based) of `total`.
    SummarizingChunk { index: usize, total: usize },
    /// Combining the partial per-chunk summaries into a final summary.
    Combining { chunk_count: usize },
}

/// Reports summarization progress; implementations typically forward this
/// to a frontend progress indicator. The default no-op is used in tests and
/// non-interactive callers.
pub trait ProgressCallback: Send + Sync {
    fn on_progress(&self, phase: &SummarizePhase);
}

/// A [`ProgressCallback`] that does nothing.
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_progress(&self, _phase: &SummarizePhase) {}
}
