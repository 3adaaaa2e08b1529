//! Protocol client.

use std::collections::BTreeMap;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;
use zmb_common::{
    Address, FrameError, GetResult, Kind, Path, ProtocolError, Request, Response, SetResult,
    Value, ZenohConfig,
};

use crate::channel::{Channel, TransportError, ZenohChannel};

/// Issues one call at a time over a [`Channel`] and unwraps the replies.
///
/// Every failure is returned to the caller as a [`ProtocolError`]; nothing is
/// retried.
pub struct Client<C> {
    channel: C,
}

impl Client<ZenohChannel> {
    /// Open a Zenoh session and bind a client to the responder at `address`.
    ///
    /// Locators carried by the address are added to the connect endpoints.
    pub async fn connect(config: &ZenohConfig, address: &Address) -> zmb_common::Result<Self> {
        let session = zmb_common::connect(&config.with_connect(address.locators())).await?;
        Ok(Self::new(ZenohChannel::connect(session, address)))
    }

    /// Bind a client to `address` over an already opened session.
    pub fn with_session(session: zenoh::Session, address: &Address) -> Self {
        Self::new(ZenohChannel::connect(session, address))
    }

    /// Bound each call by `timeout` at the transport layer.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self::new(self.channel.with_timeout(timeout))
    }

    /// Release the channel and its session.
    pub async fn close(self) -> Result<(), TransportError> {
        self.channel.close().await
    }
}

impl<C: Channel> Client<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Round-trip liveness check.
    ///
    /// Sends a fresh random token and returns whether the server echoed it
    /// exactly. An echo that is not a string counts as a mismatch.
    pub async fn test(&mut self) -> Result<bool, ProtocolError> {
        let token = Uuid::new_v4().to_string();

        match self.call(Request::Test(token.clone())).await {
            Ok(Response::Test(echo)) => Ok(echo == token),
            Ok(other) => Err(kind_mismatch(Kind::Test, &other)),
            Err(ProtocolError::InvalidResponse(FrameError::Payload {
                kind: Kind::Test, ..
            })) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read the given paths.
    ///
    /// An empty list is sent as-is. Unknown paths are the server's concern.
    pub async fn get<I, P>(&mut self, paths: I) -> Result<GetResult, ProtocolError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Path>,
    {
        let paths = paths.into_iter().map(Into::into).collect();

        match self.call(Request::Get(paths)).await? {
            Response::Get(values) => Ok(values),
            other => Err(kind_mismatch(Kind::Get, &other)),
        }
    }

    /// Write the given path/value pairs and return the per-path outcomes.
    ///
    /// When a path appears more than once the last value wins. NaN and
    /// infinite values are refused before anything is sent.
    pub async fn set<I, P, V>(&mut self, pairs: I) -> Result<SetResult, ProtocolError>
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<Path>,
        V: Into<Value>,
    {
        let pairs: BTreeMap<Path, Value> = pairs
            .into_iter()
            .map(|(path, value)| (path.into(), value.into()))
            .collect();

        match self.call(Request::Set(pairs)).await? {
            Response::Set(outcomes) => Ok(outcomes),
            other => Err(kind_mismatch(Kind::Set, &other)),
        }
    }

    /// Send one request and decode its reply.
    ///
    /// `ERROR` replies become [`ProtocolError::Reported`]; everything else that
    /// goes wrong becomes [`ProtocolError::InvalidResponse`].
    async fn call(&mut self, request: Request) -> Result<Response, ProtocolError> {
        let kind = request.kind();
        let frame = request.to_frame()?;

        debug!(kind = %kind, bytes = frame.len(), "Sending request");

        let reply = self.channel.request(frame).await.map_err(|e| {
            warn!(kind = %kind, error = %e, "Transport failure");
            FrameError::transport(e)
        })?;

        debug!(kind = %kind, bytes = reply.len(), "Reply received");

        match Response::from_frame(&reply) {
            Ok(Response::Error(message)) => {
                warn!(kind = %kind, message = %message, "Server reported an error");
                Err(ProtocolError::Reported(message))
            }
            Ok(response) => Ok(response),
            Err(e) => {
                warn!(kind = %kind, error = %e, "Invalid response");
                Err(e.into())
            }
        }
    }
}

fn kind_mismatch(expected: Kind, response: &Response) -> ProtocolError {
    let actual = response.kind();
    warn!(expected = %expected, actual = %actual, "Response kind does not match request");
    FrameError::KindMismatch { expected, actual }.into()
}
