//! Channel abstraction for message I/O.

pub mod cli;
pub mod telegram;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

pub use cli::CliChannel;
pub use telegram::TelegramChannel;

/// One inbound message from a transport.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Opaque user identity (Telegram numeric id as a string, etc.).
    pub identity: String,
    /// Transport handle (@username), when the transport has one.
    pub handle: Option<String>,
    /// Human-readable display name.
    pub display_name: String,
    /// Message text.
    pub text: String,
    /// Transport-specific routing data (e.g. telegram chat_id).
    pub metadata: serde_json::Value,
}

impl InboundEvent {
    pub fn new(identity: &str, display_name: &str, text: &str) -> Self {
        Self {
            identity: identity.to_string(),
            handle: None,
            display_name: display_name.to_string(),
            text: text.to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_handle(mut self, handle: &str) -> Self {
        self.handle = Some(handle.to_string());
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Ordered rows of option button labels presented with a reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flattened labels, for option lookups.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().flatten().map(String::as_str)
    }
}

/// One outbound message produced by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Keyboard::none())
    }
}

/// Stream of inbound events from a running transport.
pub type EventStream = Pin<Box<dyn Stream<Item = InboundEvent> + Send>>;

/// A message transport: produces inbound events, delivers replies.
#[async_trait]
pub trait Channel: Send + Sync {
    fn name(&self) -> &str;

    /// Start listening; returns the inbound event stream.
    async fn start(&self) -> Result<EventStream, ChannelError>;

    /// Deliver the router's replies for one event, in order.
    async fn respond(&self, event: &InboundEvent, replies: &[Reply]) -> Result<(), ChannelError>;

    async fn shutdown(&self) -> Result<(), ChannelError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyboard_labels_flatten_rows() {
        let kb = Keyboard::new(vec![
            vec!["a".into(), "b".into()],
            vec!["c".into()],
        ]);
        assert_eq!(kb.labels().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(!kb.is_empty());
        assert!(Keyboard::none().is_empty());
    }

    #[test]
    fn inbound_event_builders() {
        let event = InboundEvent::new("42", "Ivan", "hello")
            .with_handle("ivan_p")
            .with_metadata(serde_json::json!({"chat_id": "42"}));
        assert_eq!(event.handle.as_deref(), Some("ivan_p"));
        assert_eq!(event.metadata["chat_id"], "42");
    }
}
