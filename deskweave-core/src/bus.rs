//! The message bus capability contract.
//!
//! Backends differ in whether their bus is topic-based, target-addressed, or
//! both. The contract is topic-based with optional targeting through
//! [`MessageBusOptions::uuid`].

use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;

/// Per-call bus options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageBusOptions {
    /// Address a specific application/window instead of broadcasting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl MessageBusOptions {
    pub fn targeted(uuid: impl Into<String>) -> Self {
        Self {
            uuid: Some(uuid.into()),
        }
    }
}

/// Token returned by [`MessageBus::subscribe`].
///
/// The token is all a caller needs to unsubscribe. Equality is structural: a
/// token rebuilt from the same fields (for example after a serialization
/// round trip) identifies the same subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageBusSubscription {
    pub id: Uuid,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<MessageBusOptions>,
}

impl MessageBusSubscription {
    pub fn new(topic: impl Into<String>, options: Option<MessageBusOptions>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
            options,
        }
    }

    /// Stable structural key used to look the subscription up.
    pub fn key(&self) -> String {
        // Serializing a struct of strings cannot fail.
        serde_json::to_string(self).unwrap_or_else(|_| format!("{}:{}", self.id, self.topic))
    }
}

/// Normalized envelope handed to bus listeners alongside the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusEvent {
    pub topic: String,
}

/// Application-side bus listener.
pub type BusListener = Arc<dyn Fn(&BusEvent, &Value) + Send + Sync>;

/// Topic-based publish/subscribe.
pub trait MessageBus: Send + Sync {
    fn subscribe(
        &self,
        topic: &str,
        listener: BusListener,
        options: Option<MessageBusOptions>,
    ) -> impl Future<Output = Result<MessageBusSubscription>> + Send;

    /// Fails with [`crate::ContainerError::NotFound`] for unknown tokens,
    /// including a second unsubscribe of the same token.
    fn unsubscribe(
        &self,
        subscription: &MessageBusSubscription,
    ) -> impl Future<Output = Result<()>> + Send;

    fn publish(
        &self,
        topic: &str,
        message: Value,
        options: Option<MessageBusOptions>,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconstructed_token_is_equal() {
        let sub = MessageBusSubscription::new("prices", Some(MessageBusOptions::targeted("app")));
        let json = serde_json::to_string(&sub).unwrap();
        let rebuilt: MessageBusSubscription = serde_json::from_str(&json).unwrap();
        assert_eq!(rebuilt, sub);
        assert_eq!(rebuilt.key(), sub.key());
    }

    #[test]
    fn test_same_topic_subscriptions_are_distinct() {
        let a = MessageBusSubscription::new("prices", None);
        let b = MessageBusSubscription::new("prices", None);
        assert_ne!(a, b);
        assert_ne!(a.key(), b.key());
    }
}
