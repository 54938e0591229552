//! Contract of the host application session the maps live in.

use std::sync::Arc;

use futures::channel::oneshot;
use serde_json::Value;

/// Failure reported by the host when handing a message over.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct SessionError(pub String);

/// Reactive session of the host application, i.e. the bidirectional channel between this process
/// and the browser runtime which renders the maps.
///
/// Delivery and execution of messages are entirely the responsibility of the implementation and
/// of the receiving browser. Nothing here acknowledges, retries or reorders.
pub trait Session: Send + Sync {
    /// Send a named message to the browser.
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError>;

    /// Current value of a named input, if the browser has set it.
    fn input(&self, name: &str) -> Option<Value>;

    /// Register a one-shot callback for the next change of a named input. The receiver completes
    /// with the new value, or gets canceled if the session goes away first.
    fn on_input_change(&self, name: &str) -> oneshot::Receiver<Value>;
}

impl<T: Session + ?Sized> Session for Arc<T> {
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError> {
        (**self).send_custom_message(kind, payload)
    }

    fn input(&self, name: &str) -> Option<Value> {
        (**self).input(name)
    }

    fn on_input_change(&self, name: &str) -> oneshot::Receiver<Value> {
        (**self).on_input_change(name)
    }
}

impl<T: Session + ?Sized> Session for &T {
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError> {
        (**self).send_custom_message(kind, payload)
    }

    fn input(&self, name: &str) -> Option<Value> {
        (**self).input(name)
    }

    fn on_input_change(&self, name: &str) -> oneshot::Receiver<Value> {
        (**self).on_input_change(name)
    }
}
