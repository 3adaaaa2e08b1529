//! Single-key envelopes exchanged between client and server.
//!
//! Every frame is UTF-8 JSON of the form `{"<KIND>": <payload>}`. Requests and
//! responses are modelled as externally tagged enums, which serde renders in
//! exactly that shape. Decoding goes through [`split_frame`], which enforces
//! the envelope invariants before the payload is interpreted.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FrameError;
use crate::value::Value;

/// Identifier of one data point, e.g. `/device/slave/point`.
pub type Path = String;

/// Payload of a `GET` response.
pub type GetResult = BTreeMap<Path, Value>;

/// Payload of a `SET` response: one outcome per written path.
pub type SetResult = BTreeMap<Path, Value>;

/// Envelope kind tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Test,
    Get,
    Set,
    Error,
}

impl Kind {
    pub const ALL: [Kind; 4] = [Kind::Test, Kind::Get, Kind::Set, Kind::Error];

    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Test => "TEST",
            Kind::Get => "GET",
            Kind::Set => "SET",
            Kind::Error => "ERROR",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FrameError::UnknownKind(s.to_string()))
    }
}

/// A request envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Request {
    /// Liveness check carrying a token to be echoed.
    #[serde(rename = "TEST")]
    Test(String),

    /// Read the listed paths.
    #[serde(rename = "GET")]
    Get(Vec<Path>),

    /// Write the given path/value pairs.
    #[serde(rename = "SET")]
    Set(BTreeMap<Path, Value>),
}

impl Request {
    pub fn kind(&self) -> Kind {
        match self {
            Request::Test(_) => Kind::Test,
            Request::Get(_) => Kind::Get,
            Request::Set(_) => Kind::Set,
        }
    }

    /// Encode as a wire frame.
    ///
    /// Fails with [`FrameError::NonFinite`] if a `SET` value is NaN or infinite.
    pub fn to_frame(&self) -> Result<Vec<u8>, FrameError> {
        if let Request::Set(pairs) = self {
            ensure_finite(pairs)?;
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate a request frame.
    pub fn from_frame(frame: &[u8]) -> Result<Self, FrameError> {
        let (kind, payload) = split_frame(frame)?;
        match kind {
            Kind::Test => Ok(Request::Test(payload_as(kind, payload)?)),
            Kind::Get => Ok(Request::Get(payload_as(kind, payload)?)),
            Kind::Set => Ok(Request::Set(payload_as(kind, payload)?)),
            Kind::Error => Err(FrameError::NotARequest(kind)),
        }
    }
}

/// A response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Response {
    /// Echoed liveness token.
    #[serde(rename = "TEST")]
    Test(String),

    /// Values of the requested paths.
    #[serde(rename = "GET")]
    Get(GetResult),

    /// Per-path outcome of a write.
    #[serde(rename = "SET")]
    Set(SetResult),

    /// Failure reported by the server.
    #[serde(rename = "ERROR")]
    Error(String),
}

impl Response {
    pub fn kind(&self) -> Kind {
        match self {
            Response::Test(_) => Kind::Test,
            Response::Get(_) => Kind::Get,
            Response::Set(_) => Kind::Set,
            Response::Error(_) => Kind::Error,
        }
    }

    /// Build an `ERROR` response.
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }

    /// Encode as a wire frame.
    pub fn to_frame(&self) -> Result<Vec<u8>, FrameError> {
        if let Response::Get(values) | Response::Set(values) = self {
            ensure_finite(values)?;
        }
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and validate a response frame.
    ///
    /// A `null` `SET` payload is accepted as an empty outcome map.
    pub fn from_frame(frame: &[u8]) -> Result<Self, FrameError> {
        let (kind, payload) = split_frame(frame)?;
        match kind {
            Kind::Test => Ok(Response::Test(payload_as(kind, payload)?)),
            Kind::Get => Ok(Response::Get(payload_as(kind, payload)?)),
            Kind::Set if payload.is_null() => Ok(Response::Set(SetResult::new())),
            Kind::Set => Ok(Response::Set(payload_as(kind, payload)?)),
            Kind::Error => Ok(Response::Error(payload_as(kind, payload)?)),
        }
    }
}

/// Validate the envelope shape of a frame and split it into kind and raw payload.
///
/// The frame must be UTF-8 JSON decoding to a mapping with exactly one key,
/// and that key must be one of the four recognized kinds.
pub fn split_frame(frame: &[u8]) -> Result<(Kind, serde_json::Value), FrameError> {
    let text = std::str::from_utf8(frame)?;
    let document: serde_json::Value = serde_json::from_str(text)?;

    let map = match document {
        serde_json::Value::Object(map) => map,
        other => return Err(FrameError::NotAMapping(json_type_name(&other))),
    };

    if map.len() != 1 {
        return Err(FrameError::KeyCount(map.len()));
    }

    let (key, payload) = map
        .into_iter()
        .next()
        .ok_or(FrameError::KeyCount(0))?;

    let kind = key.parse::<Kind>()?;
    Ok((kind, payload))
}

fn ensure_finite(values: &BTreeMap<Path, Value>) -> Result<(), FrameError> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((path, _)) => Err(FrameError::NonFinite(path.clone())),
        None => Ok(()),
    }
}

fn payload_as<T: DeserializeOwned>(kind: Kind, payload: serde_json::Value) -> Result<T, FrameError> {
    serde_json::from_value(payload).map_err(|source| FrameError::Payload { kind, source })
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
