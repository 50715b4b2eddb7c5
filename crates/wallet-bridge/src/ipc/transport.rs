//! Transport channel between the page and the signing context.
//!
//! The transport moves envelopes and nothing else: it does not know which
//! capabilities exist or which responses are expected. Every inbound message
//! is handed to every registered handler, including messages that were never
//! meant for the bridge.

use crate::domain::envelope::{RequestEnvelope, ResponseEnvelope};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::trace;

/// A message arriving on the page side
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Identity of the sender as reported by the host environment
    pub origin: String,
    /// Opaque body
    pub body: Value,
}

impl InboundMessage {
    pub fn new(origin: impl Into<String>, body: Value) -> Self {
        Self {
            origin: origin.into(),
            body,
        }
    }
}

/// Listener for inbound messages
pub type MessageHandler = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// Transport error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("channel closed")]
    ChannelClosed,
    #[error("envelope undeliverable: {0}")]
    Undeliverable(String),
}

/// Duplex conduit to the signing context.
pub trait Transport: Send + Sync {
    /// Hand an envelope to the host messaging primitive.
    ///
    /// Fire-and-forget: completion arrives later as an inbound message.
    fn send(&self, envelope: RequestEnvelope) -> Result<(), TransportError>;

    /// Register a listener invoked for every inbound message.
    fn on_message(&self, handler: MessageHandler);
}

/// Registered listeners, shared by both ends of an in-memory channel.
#[derive(Default)]
struct Listeners {
    handlers: RwLock<Vec<MessageHandler>>,
}

impl Listeners {
    fn dispatch(&self, message: InboundMessage) {
        // Snapshot so a handler may register another handler without deadlocking
        let handlers: Vec<MessageHandler> = self.handlers.read().clone();
        trace!(
            origin = %message.origin,
            listeners = handlers.len(),
            "Dispatching inbound message"
        );
        for handler in handlers {
            handler(message.clone());
        }
    }
}

/// In-memory channel for single-process hosts and tests
pub mod channel {
    use super::*;

    /// Page side of an in-memory channel
    pub struct PageChannel {
        outbound: mpsc::UnboundedSender<RequestEnvelope>,
        listeners: Arc<Listeners>,
    }

    /// Privileged side of an in-memory channel
    pub struct SigningEndpoint {
        inbound: mpsc::UnboundedReceiver<RequestEnvelope>,
        listeners: Arc<Listeners>,
        origin: String,
    }

    /// Create a connected channel pair.
    ///
    /// Messages posted by the endpoint carry `origin`.
    pub fn pair(origin: impl Into<String>) -> (PageChannel, SigningEndpoint) {
        let (tx, rx) = mpsc::unbounded_channel();
        let listeners = Arc::new(Listeners::default());
        (
            PageChannel {
                outbound: tx,
                listeners: Arc::clone(&listeners),
            },
            SigningEndpoint {
                inbound: rx,
                listeners,
                origin: origin.into(),
            },
        )
    }

    impl PageChannel {
        /// Inject a message as if another script in the page had posted it.
        pub fn deliver(&self, message: InboundMessage) {
            self.listeners.dispatch(message);
        }

        /// Check whether the privileged side is still listening
        pub fn is_connected(&self) -> bool {
            !self.outbound.is_closed()
        }
    }

    impl Transport for PageChannel {
        fn send(&self, envelope: RequestEnvelope) -> Result<(), TransportError> {
            self.outbound
                .send(envelope)
                .map_err(|_| TransportError::ChannelClosed)
        }

        fn on_message(&self, handler: MessageHandler) {
            self.listeners.handlers.write().push(handler);
        }
    }

    impl SigningEndpoint {
        /// Receive the next request (None once the page side is gone)
        pub async fn recv(&mut self) -> Option<RequestEnvelope> {
            self.inbound.recv().await
        }

        /// Receive without waiting
        pub fn try_recv(&mut self) -> Option<RequestEnvelope> {
            self.inbound.try_recv().ok()
        }

        /// Post a response envelope to the page
        pub fn reply(&self, response: &ResponseEnvelope) {
            self.post(response.to_json());
        }

        /// Post an arbitrary body to the page
        pub fn post(&self, body: Value) {
            self.listeners
                .dispatch(InboundMessage::new(self.origin.clone(), body));
        }

        /// Stop accepting requests; later sends fail with `ChannelClosed`.
        pub fn close(&mut self) {
            self.inbound.close();
        }

        pub fn origin(&self) -> &str {
            &self.origin
        }
    }
}
