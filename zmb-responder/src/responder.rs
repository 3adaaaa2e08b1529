//! Server side of the protocol.
//!
//! A [`Responder`] turns every request frame into exactly one well-formed
//! response frame. Failures never escape as transport errors; they are
//! answered with an `ERROR` envelope instead.

use std::collections::BTreeMap;

use tracing::{debug, error, warn};
use zmb_common::{FrameError, GetResult, Request, Response, SetResult, Value};

use crate::store::Datastore;

/// Frame sent when a response cannot be encoded.
const FALLBACK_ERROR_FRAME: &[u8] = br#"{"ERROR":"INTERNAL ERROR"}"#;

/// Dispatches requests against a [`Datastore`].
pub struct Responder<S> {
    store: S,
}

impl<S: Datastore> Responder<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Answer one request frame with one response frame.
    pub async fn respond(&mut self, frame: &[u8]) -> Vec<u8> {
        let response = match Request::from_frame(frame) {
            Ok(request) => self.handle(request).await,
            Err(FrameError::NotARequest(kind)) => {
                warn!(kind = %kind, "Rejected non-request envelope");
                Response::error(format!("INVALID METHOD: {}", kind))
            }
            Err(e) => {
                warn!(error = %e, "Rejected malformed request");
                Response::error(format!("INVALID REQUEST: {}", e))
            }
        };

        response.to_frame().unwrap_or_else(|e| {
            error!(error = %e, "Failed to encode response");
            FALLBACK_ERROR_FRAME.to_vec()
        })
    }

    /// Execute a decoded request.
    pub async fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Test(token) => Response::Test(token),
            Request::Get(paths) => self.handle_get(paths).await,
            Request::Set(pairs) => self.handle_set(pairs).await,
        }
    }

    /// Read every path; the first unreadable path fails the whole request.
    async fn handle_get(&mut self, paths: Vec<String>) -> Response {
        debug!(count = paths.len(), "Batch read");

        let mut values = GetResult::new();
        for path in paths {
            match self.store.read(&path).await {
                Ok(value) => {
                    values.insert(path, value);
                }
                Err(e) => {
                    warn!(path = %path, error = %e, "Read failed");
                    return Response::error(e.to_string());
                }
            }
        }

        Response::Get(values)
    }

    /// Write every pair independently and report a per-path outcome.
    async fn handle_set(&mut self, pairs: BTreeMap<String, Value>) -> Response {
        debug!(count = pairs.len(), "Batch write");

        let mut outcomes = SetResult::new();
        for (path, value) in pairs {
            let applied = match self.store.write(&path, value).await {
                Ok(()) => true,
                Err(e) => {
                    warn!(path = %path, error = %e, "Write refused");
                    false
                }
            };
            outcomes.insert(path, Value::Bool(applied));
        }

        Response::Set(outcomes)
    }
}
