//! Client for the ZMB request/reply protocol.
//!
//! A [`Client`] reads and writes named data points ("paths") of a
//! Modbus-speaking server through single-key JSON envelopes carried by
//! Zenoh queries.
//!
//! ```text
//! {"TEST": "<token>"}        -> {"TEST": "<token>"}
//! {"GET": ["/dev/slave/pt"]} -> {"GET": {"/dev/slave/pt": 123}}
//! {"SET": {"/dev/slave/pt": 1}} -> {"SET": {"/dev/slave/pt": true}}
//!                            -> {"ERROR": "<message>"}
//! ```
//!
//! Calls are strictly sequential: each one takes `&mut self` and completes
//! only once its reply has been consumed.

pub mod channel;
pub mod client;
pub mod config;

pub use channel::{Channel, TransportError, ZenohChannel};
pub use client::Client;
pub use config::{ClientConfig, ConfigError};
