//! The safety envelope (spec §4.4): read-before-write enforcement, the
//! authorization gate, and the read/write path sandbox.

mod authorize;
mod error;
mod ledger;
mod rules;
mod sandbox_path;
mod sensitive;

pub use authorize::Authorizer;
pub use authorize::PermissionGate;
pub use authorize::TimeoutDenyAuthorizer;
pub use error::Result;
pub use error::SafetyError;
pub use ledger::enforce_read_before_write;
pub use ledger::record_create;
pub use ledger::record_write;
pub use rules::PermissionRuleEvaluator;
pub use sandbox_path::PathPolicy;
pub use sensitive::is_locked_directory;
pub use sensitive::is_sensitive_directory;
pub use sensitive::is_sensitive_file;
