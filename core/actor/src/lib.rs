//! Addressable, mailboxed actor fabric (spec §4.1): actors are spawned
//! into an [`ActorRegistry`] under a stable id, deliver messages either
//! through a background loop or synchronously under an actor-internal
//! mutex, and expose liveness through a [`HealthSnapshot`].

mod actor;
mod error;
mod health;
mod registry;

pub use actor::spawn;
pub use actor::Actor;
pub use actor::ActorContext;
pub use actor::ActorHandle;
pub use actor::DeliveryMode;
pub use error::ActorError;
pub use health::HealthSnapshot;
pub use registry::ActorRegistry;

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        id: String,
        total: u64,
    }

    enum CounterMsg {
        Add(u64),
        Query(tokio::sync::oneshot::Sender<u64>),
        Fail,
    }

    impl Actor for Counter {
        type Message = CounterMsg;

        fn id(&self) -> &str {
            &self.id
        }

        async fn receive(
            &mut self,
            _ctx: &ActorContext,
            message: Self::Message,
        ) -> Result<(), ActorError> {
            match message {
                CounterMsg::Add(n) => {
                    self.total += n;
                    Ok(())
                }
                CounterMsg::Query(reply) => {
                    let _ = reply.send(self.total);
                    Ok(())
                }
                CounterMsg::Fail => Err(ActorError::NotFound {
                    id: self.id.clone(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn loop_mode_processes_messages_in_order() {
        let registry = ActorRegistry::new();
        let handle = registry
            .spawn(
                Counter {
                    id: "counter-1".to_string(),
                    total: 0,
                },
                DeliveryMode::Loop,
                16,
            )
            .expect("spawn");

        handle.send(CounterMsg::Add(2)).await.expect("send");
        handle.send(CounterMsg::Add(3)).await.expect("send");

        let (tx, rx) = tokio::sync::oneshot::channel();
        handle.send(CounterMsg::Query(tx)).await.expect("send");
        assert_eq!(rx.await.expect("reply"), 5);
    }

    #[tokio::test]
    async fn sequential_mode_applies_back_pressure() {
        let registry = ActorRegistry::new();
        let handle = registry
            .spawn(
                Counter {
                    id: "counter-2".to_string(),
                    total: 0,
                },
                DeliveryMode::Sequential,
                1,
            )
            .expect("spawn");

        handle.send(CounterMsg::Add(10)).await.expect("send");
        let (tx, rx) = tokio::sync::oneshot::channel();
        handle.send(CounterMsg::Query(tx)).await.expect("send");
        assert_eq!(rx.await.expect("reply"), 10);
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let registry = ActorRegistry::new();
        registry
            .spawn(
                Counter {
                    id: "dup".to_string(),
                    total: 0,
                },
                DeliveryMode::Loop,
                4,
            )
            .expect("first spawn succeeds");

        let err = registry.spawn(
            Counter {
                id: "dup".to_string(),
                total: 0,
            },
            DeliveryMode::Loop,
            4,
        );
        assert!(matches!(err, Err(ActorError::DuplicateId { .. })));
    }

    #[tokio::test]
    async fn send_after_shutdown_fails() {
        let registry = ActorRegistry::new();
        let handle = registry
            .spawn(
                Counter {
                    id: "counter-3".to_string(),
                    total: 0,
                },
                DeliveryMode::Sequential,
                4,
            )
            .expect("spawn");

        handle.shutdown().await;
        let result = handle.send(CounterMsg::Add(1)).await;
        assert!(matches!(result, Err(ActorError::ActorStopped { .. })));
    }

    #[tokio::test]
    async fn failed_receive_is_counted_in_health() {
        let registry = ActorRegistry::new();
        let handle = registry
            .spawn(
                Counter {
                    id: "counter-4".to_string(),
                    total: 0,
                },
                DeliveryMode::Sequential,
                4,
            )
            .expect("spawn");

        let _ = handle.send(CounterMsg::Fail).await;
        assert_eq!(handle.health().error_count, 1);
    }
}
