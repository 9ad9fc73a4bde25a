//! Wasm sandbox executor (spec §4.5 "go_sandbox"): runs an untrusted WASI
//! preview1 command module, capturing stdout/stderr and bridging guest
//! shell requests through [`crate::host::add_host_shell`].

use crate::error::ExecutionSnafu;
use crate::error::ModuleLoadSnafu;
use crate::error::Result;
use crate::error::SandboxError;
use crate::host::add_host_shell;
use crate::host::HostState;
use crate::policy::PermissionChecker;
use journeyman_shell::ShellExecutor;
use snafu::ResultExt;
use std::path::Path;
use std::path::PathBuf;
use wasmtime::Config;
use wasmtime::Engine;
use wasmtime::Linker;
use wasmtime::Module;
use wasmtime::Store;
use wasmtime_wasi::pipe::MemoryOutputPipe;
use wasmtime_wasi::preview1;
use wasmtime_wasi::WasiCtxBuilder;

/// Cap on captured stdout/stderr per stream; matches the tool pipeline's
/// general result-size ceiling (spec §4.5 "large payloads must be paginated
/// or summarized").
const OUTPUT_CAP_BYTES: usize = 1_000_000;

/// Outcome of one sandboxed wasm run.
#[derive(Debug, Clone)]
pub struct SandboxRunResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Executes untrusted wasm modules under a [`PermissionChecker`].
pub struct WasmExecutor {
    engine: Engine,
}

impl WasmExecutor {
    pub fn new() -> Result<Self> {
        let mut config = Config::new();
        config.wasm_component_model(false);
        let engine = Engine::new(&config).map_err(|err| SandboxError::Execution {
            message: format!("failed to create wasm engine: {err}"),
        })?;
        Ok(Self { engine })
    }

    /// Runs `wasm_bytes` in `cwd`, gated by `checker`, with guest shell
    /// requests forwarded to `shell`. Blocks the calling thread on wasm
    /// execution and on any guest shell call; callers invoke this from
    /// `tokio::task::spawn_blocking`.
    pub fn run(
        &self,
        wasm_bytes: &[u8],
        checker: PermissionChecker,
        shell: ShellExecutor,
        cwd: &Path,
        runtime: tokio::runtime::Handle,
    ) -> Result<SandboxRunResult> {
        let module = Module::from_binary(&self.engine, wasm_bytes).map_err(|err| ModuleLoadSnafu {
            message: err.to_string(),
        }
        .build())?;

        let mut linker: Linker<HostState> = Linker::new(&self.engine);
        preview1::add_to_linker_sync(&mut linker, |state: &mut HostState| &mut state.wasi).map_err(|err| {
            SandboxError::Execution {
                message: format!("failed to link WASI: {err}"),
            }
        })?;
        add_host_shell(&mut linker).map_err(|err| SandboxError::Execution {
            message: format!("failed to link host shell bridge: {err}"),
        })?;

        let stdout_pipe = MemoryOutputPipe::new(OUTPUT_CAP_BYTES);
        let stderr_pipe = MemoryOutputPipe::new(OUTPUT_CAP_BYTES);
        let wasi = WasiCtxBuilder::new()
            .stdout(stdout_pipe.clone())
            .stderr(stderr_pipe.clone())
            .build_p1();

        let state = HostState {
            wasi,
            checker,
            shell,
            cwd: PathBuf::from(cwd),
            runtime,
        };
        let mut store = Store::new(&self.engine, state);

        let instance = linker
            .instantiate(&mut store, &module)
            .context(ExecutionSnafu {
                message: "failed to instantiate wasm module".to_string(),
            })?;

        let start = instance
            .get_typed_func::<(), ()>(&mut store, "_start")
            .context(ExecutionSnafu {
                message: "module has no WASI command entry point (_start)".to_string(),
            })?;

        let exit_code = match start.call(&mut store, ()) {
            Ok(()) => 0,
            Err(trap) => match trap.downcast_ref::<wasmtime_wasi::I32Exit>() {
                Some(exit) => exit.0,
                None => {
                    return ExecutionSnafu {
                        message: trap.to_string(),
                    }
                    .fail()
                }
            },
        };

        drop(store);
        let stdout = String::from_utf8_lossy(&stdout_pipe.contents()).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_pipe.contents()).into_owned();

        Ok(SandboxRunResult {
            stdout,
            stderr,
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::SandboxPolicy;

    #[test]
    fn construction_succeeds() {
        assert!(WasmExecutor::new().is_ok());
    }

    #[tokio::test]
    async fn unparseable_bytes_fail_as_module_load_error() {
        let executor = WasmExecutor::new().unwrap();
        let checker = PermissionChecker::new(SandboxPolicy::default());
        let shell = ShellExecutor::new();
        let runtime = tokio::runtime::Handle::current();
        let err = executor
            .run(b"not wasm", checker, shell, Path::new("/tmp"), runtime)
            .unwrap_err();
        assert!(matches!(err, SandboxError::ModuleLoad { .. }));
    }
}
