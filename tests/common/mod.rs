//! Shared test helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use serde_json::{json, Value};

use keyadmin::credential::Credential;
use keyadmin::transport::{Fault, Transport};
use keyadmin::Portal;

/// One call seen by [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub credential: Value,
    pub args: Vec<Value>,
}

/// In-process transport that records calls and replays canned results.
///
/// When no reply is queued, calls succeed with `resultCode` 100.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    replies: Mutex<VecDeque<Result<Value, Fault>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingTransport {
    pub fn replying(replies: impl IntoIterator<Item = Result<Value, Fault>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    async fn call(
        &self,
        method: &str,
        credential: &Credential,
        args: &[Value],
    ) -> Result<Value, Fault> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            credential: credential.to_value(),
            args: args.to_vec(),
        });
        let reply = self.replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(json!({ "resultCode": 100 })))
    }
}

pub fn credential() -> Credential {
    Credential::new("reseller", "pw")
}

pub fn portal(replies: impl IntoIterator<Item = Result<Value, Fault>>) -> Portal<RecordingTransport> {
    Portal::with_transport(credential(), RecordingTransport::replying(replies))
}
