//! Liveness accounting exposed by every actor through a health snapshot.

use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Instant;

/// Point-in-time liveness read, safe to hand to callers outside the
/// actor's own task (it never borrows actor state).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthSnapshot {
    /// Milliseconds since the actor was spawned at which it last entered `receive`.
    pub last_activity_millis: u64,
    /// Number of `receive` calls that returned an error.
    pub error_count: u64,
    /// Whether the actor's stop hook has not yet run.
    pub running: bool,
}

/// Interior-mutable liveness counters shared between an actor's task and
/// every [`crate::ActorHandle`] pointing at it.
#[derive(Debug)]
pub(crate) struct Health {
    started_at: Instant,
    last_activity_millis: AtomicU64,
    error_count: AtomicU64,
    running: AtomicBool,
}

impl Health {
    pub(crate) fn new() -> Self {
        Self {
            started_at: Instant::now(),
            last_activity_millis: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            running: AtomicBool::new(true),
        }
    }

    pub(crate) fn record_activity(&self) {
        let elapsed = self.started_at.elapsed().as_millis() as u64;
        self.last_activity_millis.store(elapsed, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn mark_stopped(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            last_activity_millis: self.last_activity_millis.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            running: self.running.load(Ordering::Relaxed),
        }
    }
}
