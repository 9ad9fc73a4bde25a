//! The actor trait and the two delivery modes the runtime supports.

use crate::error::ActorError;
use crate::error::ActorStoppedSnafu;
use crate::health::Health;
use crate::health::HealthSnapshot;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

/// Context handed to every lifecycle hook: carries the actor's id and a
/// cancellation token scoped to its lifetime. Every await site inside
/// `start`/`receive`/`stop` should race against `ctx.cancelled()`.
#[derive(Debug, Clone)]
pub struct ActorContext {
    id: String,
    cancel: CancellationToken,
}

impl ActorContext {
    pub(crate) fn new(id: String, cancel: CancellationToken) -> Self {
        Self { id, cancel }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the actor's scope has been cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await;
    }
}

/// An addressable, mailboxed unit of work.
///
/// Implementors are driven exclusively by the runtime: the only way to
/// change an actor's state is to send it a message through its
/// [`ActorHandle`].
pub trait Actor: Send + 'static {
    /// The message type this actor's mailbox accepts.
    type Message: Send + 'static;

    /// Stable id, unique within a single [`crate::ActorRegistry`].
    fn id(&self) -> &str;

    /// Called once before the actor receives its first message.
    fn start(
        &mut self,
        ctx: &ActorContext,
    ) -> impl std::future::Future<Output = Result<(), ActorError>> + Send {
        let _ = ctx;
        std::future::ready(Ok(()))
    }

    /// Handles one message. Errors are counted against the actor's health
    /// but do not by themselves stop it — only the registry's `shutdown`
    /// (or the actor choosing to treat an error as fatal and exiting its
    /// own loop) does that.
    fn receive(
        &mut self,
        ctx: &ActorContext,
        message: Self::Message,
    ) -> impl std::future::Future<Output = Result<(), ActorError>> + Send;

    /// Called after the context is cancelled and, in loop mode, after the
    /// mailbox has drained. No further messages will be delivered.
    fn stop(&mut self, ctx: &ActorContext) -> impl std::future::Future<Output = ()> + Send {
        let _ = ctx;
        std::future::ready(())
    }
}

/// How a mailbox delivers messages to its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Messages are enqueued and drained by a dedicated background task
    /// running the actor's receive loop. Senders do not wait for the
    /// message to be processed.
    Loop,
    /// `send` enters `receive` synchronously under an actor-internal
    /// mutex, providing natural back-pressure: a caller that models a
    /// single exclusive resource blocks until its turn.
    Sequential,
}

enum Delivery<A: Actor> {
    Loop { tx: mpsc::Sender<A::Message> },
    Sequential {
        actor: Arc<AsyncMutex<A>>,
        ctx: ActorContext,
    },
}

/// A reference to a running actor. Cheap to clone; cloning shares the
/// same mailbox and health counters.
pub struct ActorHandle<A: Actor> {
    id: String,
    delivery: Arc<Delivery<A>>,
    health: Arc<Health>,
    cancel: CancellationToken,
}

impl<A: Actor> Clone for ActorHandle<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            delivery: Arc::clone(&self.delivery),
            health: Arc::clone(&self.health),
            cancel: self.cancel.clone(),
        }
    }
}

impl<A: Actor> ActorHandle<A> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn health(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    /// Sends a message. Fails with [`ActorError::ActorStopped`] once the
    /// actor's context has been cancelled.
    pub async fn send(&self, message: A::Message) -> Result<(), ActorError> {
        if self.cancel.is_cancelled() {
            return ActorStoppedSnafu { id: self.id.clone() }.fail();
        }
        match self.delivery.as_ref() {
            Delivery::Loop { tx } => tx
                .send(message)
                .await
                .map_err(|_| ActorStoppedSnafu { id: self.id.clone() }.build()),
            Delivery::Sequential { actor, ctx } => {
                let mut guard = actor.lock().await;
                self.health.record_activity();
                let result = guard.receive(ctx, message).await;
                if result.is_err() {
                    self.health.record_error();
                }
                result
            }
        }
    }

    /// Cancels the actor's context. In loop mode the background task
    /// drains any already-enqueued messages, then calls `stop`; in
    /// sequential mode `stop` runs as soon as the internal mutex is free.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Delivery::Sequential { actor, ctx } = self.delivery.as_ref() {
            let mut guard = actor.lock().await;
            guard.stop(ctx).await;
            self.health.mark_stopped();
        }
        // Loop mode marks itself stopped from inside its drain task.
    }
}

/// Spawns `actor` under the given delivery mode, returning a handle.
/// `parent_cancel` scopes the actor's lifetime to its owner (typically an
/// [`crate::ActorRegistry`]); cancelling it cancels every actor spawned
/// from it.
pub fn spawn<A: Actor>(
    mut actor: A,
    mode: DeliveryMode,
    parent_cancel: &CancellationToken,
    mailbox_capacity: usize,
) -> ActorHandle<A> {
    let id = actor.id().to_string();
    let cancel = parent_cancel.child_token();
    let ctx = ActorContext::new(id.clone(), cancel.clone());
    let health = Arc::new(Health::new());

    match mode {
        DeliveryMode::Loop => {
            let (tx, mut rx) = mpsc::channel::<A::Message>(mailbox_capacity);
            let health_task = Arc::clone(&health);
            let ctx_task = ctx.clone();
            tokio::spawn(async move {
                if let Err(err) = actor.start(&ctx_task).await {
                    warn!(id = %ctx_task.id(), error = %err, "actor start failed");
                }
                loop {
                    tokio::select! {
                        _ = ctx_task.cancelled() => break,
                        message = rx.recv() => {
                            match message {
                                Some(message) => {
                                    health_task.record_activity();
                                    if let Err(err) = actor.receive(&ctx_task, message).await {
                                        health_task.record_error();
                                        warn!(id = %ctx_task.id(), error = %err, "actor receive failed");
                                    }
                                }
                                None => break,
                            }
                        }
                    }
                }
                actor.stop(&ctx_task).await;
                health_task.mark_stopped();
                debug!(id = %ctx_task.id(), "actor loop stopped");
            });
            ActorHandle {
                id,
                delivery: Arc::new(Delivery::Loop { tx }),
                health,
                cancel,
            }
        }
        DeliveryMode::Sequential => {
            let actor = Arc::new(AsyncMutex::new(actor));
            {
                let actor = Arc::clone(&actor);
                let ctx = ctx.clone();
                let health = Arc::clone(&health);
                tokio::spawn(async move {
                    let mut guard = actor.lock().await;
                    if let Err(err) = guard.start(&ctx).await {
                        warn!(id = %ctx.id(), error = %err, "actor start failed");
                        health.record_error();
                    }
                });
            }
            ActorHandle {
                id,
                delivery: Arc::new(Delivery::Sequential { actor, ctx }),
                health,
                cancel,
            }
        }
    }
}
