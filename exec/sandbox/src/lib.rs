//! Wasm-based sandbox executor (spec §4.5 "go_sandbox"): loads an untrusted
//! WASI preview1 command module, enforces a [`policy::SandboxPolicy`] on its
//! filesystem and network access, and bridges a single host shell call
//! through [`host::add_host_shell`].

mod error;
mod executor;
mod host;
mod policy;

pub use error::Result;
pub use error::SandboxError;
pub use executor::SandboxRunResult;
pub use executor::WasmExecutor;
pub use host::HostState;
pub use policy::PermissionChecker;
pub use policy::SandboxMode;
pub use policy::SandboxPolicy;
