//! Host ABI exposed to a sandboxed guest (spec §4.5 "go_sandbox": "the Shell
//! host call bridged to the Shell controller under authorization"). The
//! only host import a guest module gets beyond WASI preview1 is a single
//! `host::shell_exec` function; guest filesystem access goes through WASI's
//! own preopened-directory mechanism, gated by the same [`PermissionChecker`]
//! at setup time rather than per-call.

use crate::policy::PermissionChecker;
use journeyman_shell::ShellExecutor;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wasmtime::Caller;
use wasmtime::Linker;
use wasmtime::Memory;
use wasmtime_wasi::preview1::WasiP1Ctx;

const SHELL_TIMEOUT_SECS: u64 = 30;

/// Per-instance host state: the WASI context plus everything
/// `host::shell_exec` needs to bridge into the real shell controller.
pub struct HostState {
    pub wasi: WasiP1Ctx,
    pub checker: PermissionChecker,
    pub shell: ShellExecutor,
    pub cwd: PathBuf,
    pub runtime: tokio::runtime::Handle,
}

/// Registers `host::shell_exec(cmd_ptr, cmd_len, out_ptr, out_cap) -> i32`.
/// Returns the number of bytes written to the guest's output buffer, or a
/// negative value on failure (`-1` bad pointers, `-2` denied by policy).
pub fn add_host_shell(linker: &mut Linker<HostState>) -> wasmtime::Result<()> {
    linker.func_wrap(
        "host",
        "shell_exec",
        |mut caller: Caller<'_, HostState>, cmd_ptr: i32, cmd_len: i32, out_ptr: i32, out_cap: i32| -> i32 {
            let Some(memory) = caller.get_export("memory").and_then(|e| e.into_memory()) else {
                return -1;
            };
            let Some(command) = read_guest_string(&caller, &memory, cmd_ptr, cmd_len) else {
                return -1;
            };

            if caller.data().checker.check_network().is_err() {
                return -2;
            }

            let shell = caller.data().shell.clone();
            let cwd = caller.data().cwd.clone();
            let runtime = caller.data().runtime.clone();
            let result = runtime.block_on(async move {
                shell
                    .execute(
                        &command,
                        &cwd,
                        Duration::from_secs(SHELL_TIMEOUT_SECS),
                        &CancellationToken::new(),
                    )
                    .await
            });

            let combined = if result.stderr.is_empty() {
                result.stdout
            } else {
                format!("{}\nSTDERR:\n{}", result.stdout, result.stderr)
            };
            write_guest_string(&mut caller, &memory, out_ptr, out_cap, &combined)
        },
    )?;
    Ok(())
}

fn read_guest_string(caller: &Caller<'_, HostState>, memory: &Memory, ptr: i32, len: i32) -> Option<String> {
    if ptr < 0 || len < 0 {
        return None;
    }
    let data = memory.data(caller);
    let start = ptr as usize;
    let end = start.checked_add(len as usize)?;
    let bytes = data.get(start..end)?;
    String::from_utf8(bytes.to_vec()).ok()
}

fn write_guest_string(caller: &mut Caller<'_, HostState>, memory: &Memory, ptr: i32, cap: i32, text: &str) -> i32 {
    if ptr < 0 || cap < 0 {
        return -1;
    }
    let bytes = text.as_bytes();
    let n = bytes.len().min(cap as usize);
    let data = memory.data_mut(caller);
    let start = ptr as usize;
    let Some(end) = start.checked_add(n) else {
        return -1;
    };
    if end > data.len() {
        return -1;
    }
    data[start..end].copy_from_slice(&bytes[..n]);
    n as i32
}
