//! Request/reply transport.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::trace;
use zenoh::Session;
use zmb_common::Address;

/// A strict request/reply conduit to one responder.
///
/// Each call sends one frame and resolves with the matching reply frame.
/// Taking `&mut self` means a second request cannot be issued while a reply
/// is still pending.
pub trait Channel: Send {
    /// Transport failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send a request frame and wait for its reply.
    fn request(
        &mut self,
        frame: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;
}

/// Errors raised by [`ZenohChannel`].
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Zenoh error: {0}")]
    Zenoh(String),

    #[error("No reply from '{0}'")]
    NoReply(String),

    #[error("'{key}' answered with a query error: {message}")]
    QueryError { key: String, message: String },
}

impl From<zenoh::Error> for TransportError {
    fn from(err: zenoh::Error) -> Self {
        Self::Zenoh(err.to_string())
    }
}

/// [`Channel`] over Zenoh queries.
///
/// Each request is a `get` on the responder's key expression carrying the
/// frame as payload; the first reply is the response. The session is owned
/// by the channel and closed with it.
pub struct ZenohChannel {
    session: Session,
    key_expr: String,
    timeout: Option<Duration>,
}

impl ZenohChannel {
    /// Bind a channel to the responder at `address` over `session`.
    ///
    /// No message is exchanged; the responder is only contacted on the first
    /// request.
    pub fn connect(session: Session, address: &Address) -> Self {
        Self {
            session,
            key_expr: address.key_expr().to_string(),
            timeout: None,
        }
    }

    /// Bound every query by `timeout` instead of the Zenoh default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Close the underlying session.
    pub async fn close(self) -> Result<(), TransportError> {
        self.session.close().await?;
        Ok(())
    }
}

impl Channel for ZenohChannel {
    type Error = TransportError;

    async fn request(&mut self, frame: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let mut query = self.session.get(self.key_expr.as_str()).payload(frame);
        if let Some(timeout) = self.timeout {
            query = query.timeout(timeout);
        }

        let replies = query.await?;

        let reply = replies
            .recv_async()
            .await
            .map_err(|_| TransportError::NoReply(self.key_expr.clone()))?;

        match reply.result() {
            Ok(sample) => {
                let payload = sample.payload().to_bytes().into_owned();
                trace!(key = %self.key_expr, bytes = payload.len(), "Query answered");
                Ok(payload)
            }
            Err(err) => Err(TransportError::QueryError {
                key: self.key_expr.clone(),
                message: String::from_utf8_lossy(&err.payload().to_bytes()).into_owned(),
            }),
        }
    }
}
