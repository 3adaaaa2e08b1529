//! Reference responder for the ZMB request/reply protocol.
//!
//! Answers `TEST`, `GET` and `SET` envelopes arriving as Zenoh queries on a
//! single key expression, backed by a path-keyed [`Datastore`]. Every query
//! gets exactly one single-key envelope in reply; failures are reported as
//! `{"ERROR": "<message>"}`.

pub mod config;
pub mod responder;
pub mod server;
pub mod store;

pub use config::{ConfigError, ResponderConfig};
pub use responder::Responder;
pub use server::{ServeError, serve};
pub use store::{DataType, Datastore, MemoryStore, StoreError};
