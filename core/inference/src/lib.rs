//! LLM client abstraction (spec §4.9): a single [`Model`] capability trait
//! the orchestrator drives regardless of provider, plus the ambient
//! token-estimation and message-normalization seams every provider needs.

mod error;
mod estimator;
mod mock;
mod model;
mod normalize;
mod types;

pub use error::InferenceError;
pub use error::NoEndpointsSnafu;
pub use error::Result;
pub use estimator::estimate_tokens_default;
pub use estimator::estimate_tokens_with_ratio;
pub use mock::MockModel;
pub use model::Model;
pub use normalize::IdentityNormalizer;
pub use normalize::MergeConsecutiveSameRole;
pub use normalize::NormalizeMessages;
pub use types::CompletionRequest;
pub use types::CompletionResponse;
pub use types::FinishReason;
pub use types::StreamDelta;
