//! [`MessageBus`] over the Glue42 bus.
//!
//! `options.uuid` becomes the Glue42 `target`. The adapter keeps each raw
//! unsubscribe handle under the subscription token's structural key, together
//! with an `active` flag checked on every delivery so a message the runtime
//! delivers after unsubscribe never reaches the removed listener.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use deskweave_core::events::invoke_isolated;
use deskweave_core::{
    BusEvent, BusListener, ContainerError, MessageBus, MessageBusOptions, MessageBusSubscription,
    Result,
};
use parking_lot::Mutex;
use serde_json::Value;

use crate::driver::GdBus;

struct BusEntry<H> {
    handle: H,
    active: Arc<AtomicBool>,
}

fn target_of(options: Option<&MessageBusOptions>) -> Option<String> {
    options.and_then(|o| o.uuid.clone())
}

pub struct Glue42MessageBus<B: GdBus> {
    bus: B,
    subscriptions: Mutex<HashMap<String, BusEntry<B::Handle>>>,
}

impl<B: GdBus> Glue42MessageBus<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.lock().len()
    }
}

impl<B: GdBus> MessageBus for Glue42MessageBus<B> {
    async fn subscribe(
        &self,
        topic: &str,
        listener: BusListener,
        options: Option<MessageBusOptions>,
    ) -> Result<MessageBusSubscription> {
        let active = Arc::new(AtomicBool::new(true));
        let gate = Arc::clone(&active);
        let callback = Arc::new(move |data: &Value, topic: &str| {
            if !gate.load(Ordering::Acquire) {
                log::debug!("Dropping late bus delivery on '{topic}'");
                return;
            }
            let event = BusEvent {
                topic: topic.to_string(),
            };
            invoke_isolated(topic, || listener(&event, data));
        });

        let handle = self
            .bus
            .subscribe(topic, callback, target_of(options.as_ref()))
            .await?;

        let subscription = MessageBusSubscription::new(topic, options);
        self.subscriptions
            .lock()
            .insert(subscription.key(), BusEntry { handle, active });
        log::debug!("Subscribed to bus topic '{topic}'");
        Ok(subscription)
    }

    async fn unsubscribe(&self, subscription: &MessageBusSubscription) -> Result<()> {
        let entry = self.subscriptions.lock().remove(&subscription.key());
        let Some(entry) = entry else {
            return Err(ContainerError::NotFound(format!(
                "bus subscription to '{}'",
                subscription.topic
            )));
        };
        entry.active.store(false, Ordering::Release);
        self.bus.unsubscribe(entry.handle).await?;
        Ok(())
    }

    async fn publish(
        &self,
        topic: &str,
        message: Value,
        options: Option<MessageBusOptions>,
    ) -> Result<()> {
        Ok(self
            .bus
            .publish(topic, message, target_of(options.as_ref()))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDesktop;
    use crate::driver::GdDesktop;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn bus() -> (MockDesktop, Glue42MessageBus<crate::mock::MockBus>) {
        let desktop = MockDesktop::new();
        let bus = Glue42MessageBus::new(desktop.bus().unwrap());
        (desktop, bus)
    }

    fn recorder() -> (BusListener, Arc<Mutex<Vec<(String, Value)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let listener: BusListener = Arc::new(move |event: &BusEvent, message: &Value| {
            sink.lock().push((event.topic.clone(), message.clone()));
        });
        (listener, seen)
    }

    #[tokio::test]
    async fn test_publish_reaches_subscriber_with_topic() {
        let (_desktop, bus) = bus();
        let (listener, seen) = recorder();
        bus.subscribe("prices", listener, None).await.unwrap();

        bus.publish("prices", json!({"px": 101}), None).await.unwrap();
        bus.publish("other", json!(1), None).await.unwrap();

        assert_eq!(*seen.lock(), vec![("prices".to_string(), json!({"px": 101}))]);
    }

    #[tokio::test]
    async fn test_uuid_becomes_target() {
        let (desktop, bus) = bus();
        bus.publish("t", json!(null), Some(MessageBusOptions::targeted("app-2")))
            .await
            .unwrap();
        let published = desktop.published();
        assert_eq!(published[0].2.as_deref(), Some("app-2"));
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_is_not_found() {
        let (_desktop, bus) = bus();
        let stranger = MessageBusSubscription::new("prices", None);
        assert!(bus.unsubscribe(&stranger).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_reconstructed_token_unsubscribes() {
        let (_desktop, bus) = bus();
        let (listener, _) = recorder();
        let sub = bus.subscribe("prices", listener, None).await.unwrap();

        let rebuilt: MessageBusSubscription =
            serde_json::from_str(&serde_json::to_string(&sub).unwrap()).unwrap();
        bus.unsubscribe(&rebuilt).await.unwrap();
        assert_eq!(bus.subscription_count(), 0);
        assert!(bus.unsubscribe(&sub).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_late_delivery_after_unsubscribe_is_dropped() {
        let (desktop, bus) = bus();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = bus
            .subscribe(
                "prices",
                Arc::new(move |_: &BusEvent, _: &Value| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
                None,
            )
            .await
            .unwrap();
        bus.unsubscribe(&sub).await.unwrap();

        desktop.deliver_late("prices", json!(1));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}
