//! Stand-in for the host session of a browser-rendered map, for testing code built on `mapgl`.

use futures::channel::oneshot;
use mapgl::{Session, SessionError};
use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};

/// Message handed to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    /// Channel name, e.g. `maplibre-proxy`.
    pub kind: String,
    pub payload: Value,
}

impl Sent {
    /// The `message` inside the envelope.
    pub fn message(&self) -> &Value {
        &self.payload["message"]
    }

    /// Value of the message's `type` discriminator.
    pub fn message_type(&self) -> &str {
        self.message()["type"].as_str().unwrap_or_default()
    }
}

#[derive(Default)]
struct State {
    /// Expectations made with [`MockSession::expect`], keyed by message type, with the input to
    /// set once the message arrives.
    expectations: HashMap<String, Option<(String, Value)>>,

    sent: Vec<Sent>,
    unexpected: Vec<String>,
    inputs: HashMap<String, Value>,
    callbacks: HashMap<String, oneshot::Sender<Value>>,
    failing: bool,
}

impl State {
    fn set_input(&mut self, name: String, value: Value) {
        log::info!("Setting input '{name}'.");
        if let Some(tx) = self.callbacks.remove(&name) {
            let _ = tx.send(value.clone());
        }
        self.inputs.insert(name, value);
    }
}

pub struct MockSession {
    state: Mutex<State>,
    strict: bool,
}

impl MockSession {
    /// Session which records every message.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            strict: false,
        }
    }

    /// Session which only accepts messages announced with [`MockSession::expect`]. Dropping it
    /// after anything else was sent panics.
    pub fn strict() -> Self {
        Self {
            state: Mutex::new(State::default()),
            strict: true,
        }
    }

    /// Expect a message of the given type.
    pub fn expect(&self, message_type: &str) -> Expectation<'_> {
        log::info!("Expecting '{message_type}'.");
        self.state()
            .expectations
            .insert(message_type.to_owned(), None);
        Expectation {
            session: self,
            message_type: message_type.to_owned(),
        }
    }

    /// Set an input the way the browser would, completing a pending input change callback.
    pub fn set_input(&self, name: &str, value: Value) {
        self.state().set_input(name.to_owned(), value);
    }

    /// Make further sends fail, as with a disconnected client.
    pub fn fail_sends(&self) {
        self.state().failing = true;
    }

    /// Drop all pending input change callbacks, as a closing session would.
    pub fn close(&self) {
        log::info!("Closing.");
        self.state().callbacks.clear();
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state().sent.clone()
    }

    /// Types of all messages sent so far, in order.
    pub fn message_types(&self) -> Vec<String> {
        self.state()
            .sent
            .iter()
            .map(|sent| sent.message_type().to_owned())
            .collect()
    }

    /// Whether all expectations were met.
    pub fn satisfied(&self) -> bool {
        self.state().expectations.is_empty()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Session for MockSession {
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError> {
        let sent = Sent {
            kind: kind.to_owned(),
            payload,
        };
        let message_type = sent.message_type().to_owned();
        log::info!("Incoming '{message_type}' on '{kind}'.");

        let mut state = self.state();
        if state.failing {
            return Err(SessionError("client disconnected".to_owned()));
        }

        match state.expectations.remove(&message_type) {
            Some(Some((input, value))) => state.set_input(input, value),
            Some(None) => (),
            None if self.strict => {
                log::warn!("Unexpected '{message_type}'.");
                state.unexpected.push(message_type);
            }
            None => (),
        }
        state.sent.push(sent);
        Ok(())
    }

    fn input(&self, name: &str) -> Option<Value> {
        self.state().inputs.get(name).cloned()
    }

    fn on_input_change(&self, name: &str) -> oneshot::Receiver<Value> {
        let (tx, rx) = oneshot::channel();
        self.state().callbacks.insert(name.to_owned(), tx);
        rx
    }
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let state = self.state();
        assert!(
            state.unexpected.is_empty(),
            "there are unexpected messages: {:?}",
            state.unexpected
        );
    }
}

/// A message the session waits for.
pub struct Expectation<'a> {
    session: &'a MockSession,
    message_type: String,
}

impl Expectation<'_> {
    /// Once the message arrives, answer it by setting `input`, like the browser answers queries.
    pub fn respond(self, input: &str, value: Value) {
        log::info!("Responding to '{}' through '{input}'.", self.message_type);
        let mut state = self.session.state();
        if state.expectations.contains_key(&self.message_type) {
            state
                .expectations
                .insert(self.message_type, Some((input.to_owned(), value)));
        } else {
            // Already arrived.
            state.set_input(input.to_owned(), value);
        }
    }
}
