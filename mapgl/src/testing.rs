//! Session double for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use futures::channel::oneshot;
use serde_json::Value;

use crate::session::{Session, SessionError};

#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub kind: String,
    pub payload: Value,
}

#[derive(Default)]
pub struct RecordingSession {
    sent: Mutex<Vec<Sent>>,
    inputs: Mutex<HashMap<String, Value>>,
    callbacks: Mutex<HashMap<String, oneshot::Sender<Value>>>,
    replies: Mutex<Vec<(String, Option<Value>)>>,
}

impl RecordingSession {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Set an input the way the browser would, firing a registered callback.
    pub fn set_input(&self, name: &str, value: Value) {
        self.inputs
            .lock()
            .unwrap()
            .insert(name.to_owned(), value.clone());
        if let Some(tx) = self.callbacks.lock().unwrap().remove(name) {
            let _ = tx.send(value);
        }
    }

    /// Answer the next sent message by setting `name`, like the browser does for queries.
    pub fn reply_on_send(&self, name: &str, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .push((name.to_owned(), Some(value)));
    }

    /// Drop the callback of `name` on the next sent message, as a closing session would.
    pub fn cancel_on_send(&self, name: &str) {
        self.replies.lock().unwrap().push((name.to_owned(), None));
    }
}

impl Session for RecordingSession {
    fn send_custom_message(&self, kind: &str, payload: Value) -> Result<(), SessionError> {
        self.sent.lock().unwrap().push(Sent {
            kind: kind.to_owned(),
            payload,
        });
        let replies = std::mem::take(&mut *self.replies.lock().unwrap());
        for (name, value) in replies {
            match value {
                Some(value) => self.set_input(&name, value),
                None => drop(self.callbacks.lock().unwrap().remove(&name)),
            }
        }
        Ok(())
    }

    fn input(&self, name: &str) -> Option<Value> {
        self.inputs.lock().unwrap().get(name).cloned()
    }

    fn on_input_change(&self, name: &str) -> oneshot::Receiver<Value> {
        let (tx, rx) = oneshot::channel();
        self.callbacks.lock().unwrap().insert(name.to_owned(), tx);
        rx
    }
}
