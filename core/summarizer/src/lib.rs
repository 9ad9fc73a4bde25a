//! Chunked map-reduce text summarizer (spec §4.10), used by the
//! orchestrator's compaction pass and by any tool that needs to condense
//! large output (e.g. `read_file_summarized`).

mod chunker;
mod error;
mod summarize;
mod types;

pub use chunker::chunk_text;
pub use error::Result;
pub use error::SummarizerError;
pub use summarize::summarize;
pub use summarize::summarize_with_progress;
pub use types::NoopProgress;
pub use types::ProgressCallback;
pub use types::SummarizePhase;
pub use types::SummarizerConfig;
