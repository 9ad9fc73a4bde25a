//! The system registry: spawns actors by id, resolves them for callers
//! that only hold an id, and shuts the whole fabric down.
//!
//! Actors reference each other by id and resolve through the registry
//! rather than holding direct handles, so cyclic references between
//! actors never become cyclic `Arc` ownership.

use crate::actor::spawn;
use crate::actor::Actor;
use crate::actor::ActorHandle;
use crate::actor::DeliveryMode;
use crate::error::ActorError;
use crate::error::DuplicateIdSnafu;
use crate::error::NotFoundSnafu;
use crate::health::HealthSnapshot;
use snafu::ensure;
use snafu::OptionExt;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

trait ErasedHandle: Send + Sync {
    fn id(&self) -> &str;
    fn health(&self) -> HealthSnapshot;
    fn as_any(&self) -> &dyn Any;
}

impl<A: Actor> ErasedHandle for ActorHandle<A> {
    fn id(&self) -> &str {
        ActorHandle::id(self)
    }

    fn health(&self) -> HealthSnapshot {
        ActorHandle::health(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Owns every actor spawned through it and guards spawning/lookup with a
/// short-held mutex; no await happens while the lock is taken.
#[derive(Clone)]
pub struct ActorRegistry {
    entries: Arc<Mutex<HashMap<String, Arc<dyn ErasedHandle>>>>,
    cancel: CancellationToken,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawns `actor` under `mode`, rejecting duplicate ids.
    pub fn spawn<A: Actor>(
        &self,
        actor: A,
        mode: DeliveryMode,
        mailbox_capacity: usize,
    ) -> Result<ActorHandle<A>, ActorError> {
        let id = actor.id().to_string();
        {
            let entries = self.entries.lock().expect("registry mutex poisoned");
            ensure!(!entries.contains_key(&id), DuplicateIdSnafu { id: id.clone() });
        }
        let handle = spawn(actor, mode, &self.cancel, mailbox_capacity);
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        // Re-check under lock in case of a racing spawn with the same id.
        ensure!(!entries.contains_key(&id), DuplicateIdSnafu { id });
        entries.insert(handle.id().to_string(), Arc::new(handle.clone()));
        Ok(handle)
    }

    /// Resolves a previously spawned actor's typed handle by id. Returns
    /// `None` if no actor is registered under that id, or if one is but
    /// was spawned with a different `Actor` type.
    pub fn get<A: Actor>(&self, id: &str) -> Option<ActorHandle<A>> {
        let entries = self.entries.lock().expect("registry mutex poisoned");
        entries
            .get(id)
            .and_then(|entry| entry.as_any().downcast_ref::<ActorHandle<A>>())
            .cloned()
    }

    /// Resolves a handle's health snapshot by id without knowing its
    /// concrete `Actor` type.
    pub fn health(&self, id: &str) -> Result<HealthSnapshot, ActorError> {
        let entries = self.entries.lock().expect("registry mutex poisoned");
        let entry = entries.get(id).context(NotFoundSnafu { id })?;
        Ok(entry.health())
    }

    /// All registered ids, for diagnostics.
    pub fn ids(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("registry mutex poisoned");
        entries.keys().cloned().collect()
    }

    /// Cancels every actor's context. Sequential-mode actors run their
    /// `stop` hook as soon as their internal mutex is free; loop-mode
    /// actors drain their mailbox first. Does not wait for either.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let mut entries = self.entries.lock().expect("registry mutex poisoned");
        entries.clear();
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
