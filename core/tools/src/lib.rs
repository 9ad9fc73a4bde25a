//! Tool pipeline and reserved tool set (spec §4.5–§4.7): the 5-stage
//! [`Tool`] trait, a per-session [`ToolRegistry`], the §4.7 parallel
//! dispatcher, and the baseline tools every session registers.

mod asker;
pub mod builtin;
mod context;
mod error;
mod executor;
mod registry;
mod tool;

pub use asker::UnattendedAsker;
pub use asker::UserAsker;
pub use context::ToolContext;
pub use error::Result;
pub use error::ToolError;
pub use executor::dispatch_calls;
pub use executor::run_one;
pub use executor::DispatchResult;
pub use registry::ToolRegistry;
pub use tool::Tool;

/// Registers the full reserved tool set (spec §4.5) into a fresh registry.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    builtin::register_all(&mut registry);
    registry
}
