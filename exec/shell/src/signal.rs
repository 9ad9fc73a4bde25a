//! Process-group signaling (spec §4.6 "signal (TERM or KILL; prefer
//! process-group signal, fall back to process, fall back to cancellation)").

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Term,
    Kill,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Term => "TERM",
            Signal::Kill => "KILL",
        }
    }
}

/// Attempts to deliver `signal` to the process group `pgid`, falling back to
/// the single process `pid` if the group signal fails. Returns true if
/// either delivery reported success.
#[cfg(unix)]
pub fn signal_process(pid: u32, pgid: Option<u32>, signal: Signal) -> bool {
    let sig = match signal {
        Signal::Term => libc::SIGTERM,
        Signal::Kill => libc::SIGKILL,
    };

    if let Some(pgid) = pgid {
        // killpg targets the process group; a negative pid to kill() does
        // the same thing, but killpg is the clearer call.
        let rc = unsafe { libc::killpg(pgid as libc::pid_t, sig) };
        if rc == 0 {
            return true;
        }
    }

    let rc = unsafe { libc::kill(pid as libc::pid_t, sig) };
    rc == 0
}

#[cfg(not(unix))]
pub fn signal_process(_pid: u32, _pgid: Option<u32>, _signal: Signal) -> bool {
    false
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn signaling_a_dead_pid_reports_failure() {
        // A pid vanishingly unlikely to be alive.
        assert!(!signal_process(999_999, None, Signal::Term));
    }
}
