use thiserror::Error;

use crate::envelope::Kind;

/// Common error type for ZMB components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid address: {0}")]
    Address(String),

    #[error("Zenoh error: {0}")]
    Zenoh(#[from] zenoh::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using ZMB's Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a frame could not be turned into an envelope.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("frame is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a mapping, got {0}")]
    NotAMapping(&'static str),

    #[error("expected exactly one key, got {0}")]
    KeyCount(usize),

    #[error("unrecognized kind '{0}'")]
    UnknownKind(String),

    #[error("{0} is not a request kind")]
    NotARequest(Kind),

    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: Kind,
        #[source]
        source: serde_json::Error,
    },

    #[error("value for '{0}' is not a finite number")]
    NonFinite(String),

    #[error("expected a {expected} response, got {actual}")]
    KindMismatch { expected: Kind, actual: Kind },

    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl FrameError {
    /// Wrap a transport-level failure.
    pub fn transport<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport(Box::new(source))
    }
}

/// The two failure kinds a protocol call can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The reply could not be received or did not decode to a valid envelope.
    InvalidResponse,
    /// The server answered with an `ERROR` envelope.
    Reported,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidResponse => "INVALID_RESPONSE",
            ErrorKind::Reported => "ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single protocol call.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Malformed reply or transport failure; the cause is kept as the source.
    #[error("INVALID_RESPONSE: {0}")]
    InvalidResponse(#[source] FrameError),

    /// Message reported by the server, verbatim.
    #[error("{0}")]
    Reported(String),
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ProtocolError::Reported(_) => ErrorKind::Reported,
        }
    }

    /// The server-supplied message, if this is a reported failure.
    pub fn reported_message(&self) -> Option<&str> {
        match self {
            ProtocolError::Reported(message) => Some(message),
            ProtocolError::InvalidResponse(_) => None,
        }
    }
}

impl From<FrameError> for ProtocolError {
    fn from(e: FrameError) -> Self {
        ProtocolError::InvalidResponse(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_reported_display_is_verbatim() {
        let err = ProtocolError::Reported("disk full".to_string());
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(err.kind(), ErrorKind::Reported);
        assert_eq!(err.reported_message(), Some("disk full"));
    }

    #[test]
    fn test_invalid_response_keeps_cause() {
        let err = ProtocolError::from(FrameError::KeyCount(2));
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
        assert!(err.reported_message().is_none());

        let source = err.source().expect("cause should be kept");
        assert_eq!(source.to_string(), "expected exactly one key, got 2");
    }

    #[test]
    fn test_error_kind_names() {
        assert_eq!(ErrorKind::InvalidResponse.to_string(), "INVALID_RESPONSE");
        assert_eq!(ErrorKind::Reported.to_string(), "ERROR");
    }
}
