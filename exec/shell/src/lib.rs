//! Shell and background-job controller (spec §4.6): foreground command
//! execution with a timeout-cancelling scoped context, plus a background
//! controller that spawns into a fresh process group and exposes
//! list/snapshot/wait/signal against a job id.

mod background;
mod command;
mod error;
mod executor;
mod port_probe;
mod signal;

pub use background::BackgroundController;
pub use command::CommandResult;
pub use error::JobNotFoundSnafu;
pub use error::Result;
pub use error::ShellError;
pub use error::SpawnSnafu;
pub use executor::ShellExecutor;
pub use executor::DEFAULT_TIMEOUT_SECS;
pub use executor::MAX_TIMEOUT_SECS;
pub use port_probe::probe_listening_ports;
pub use signal::signal_process;
pub use signal::Signal;
