//! Integration tests for zmb-common library.

use std::collections::BTreeMap;
use std::error::Error as _;
use zmb_common::{
    Address, ErrorKind, FrameError, Kind, ProtocolError, Request, Response, Value, split_frame,
};

#[test]
fn test_request_response_workflow() {
    // Client encodes a SET
    let mut pairs = BTreeMap::new();
    pairs.insert("/a/b/c".to_string(), Value::Integer(123));
    let frame = Request::Set(pairs.clone()).to_frame().expect("encode failed");
    assert_eq!(String::from_utf8(frame.clone()).unwrap(), r#"{"SET":{"/a/b/c":123}}"#);

    // Server decodes it
    let request = Request::from_frame(&frame).expect("decode failed");
    assert_eq!(request, Request::Set(pairs));
    assert_eq!(request.kind(), Kind::Set);

    // Server answers, client decodes
    let mut outcomes = BTreeMap::new();
    outcomes.insert("/a/b/c".to_string(), Value::Bool(true));
    let reply = Response::Set(outcomes.clone()).to_frame().expect("encode failed");
    assert_eq!(String::from_utf8(reply.clone()).unwrap(), r#"{"SET":{"/a/b/c":true}}"#);
    assert_eq!(Response::from_frame(&reply).unwrap(), Response::Set(outcomes));
}

#[test]
fn test_split_frame_keeps_raw_payload() {
    let (kind, payload) = split_frame(br#"{"GET": {"/x": [1, 2]}}"#).unwrap();
    assert_eq!(kind, Kind::Get);
    assert_eq!(payload, serde_json::json!({"/x": [1, 2]}));
}

#[test]
fn test_malformed_frame_becomes_invalid_response() {
    let err: ProtocolError = Response::from_frame(br#"{"TEST": "a", "GET": []}"#)
        .unwrap_err()
        .into();

    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    assert!(err.to_string().starts_with("INVALID_RESPONSE"));
    assert!(matches!(
        err.source().and_then(|s| s.downcast_ref::<FrameError>()),
        Some(FrameError::KeyCount(2))
    ));
}

#[test]
fn test_address_round_trip() {
    let address: Address = "zmb/line1@tcp/192.168.1.10:7447".parse().unwrap();
    assert_eq!(address.key_expr(), "zmb/line1");
    assert_eq!(address.to_string(), "zmb/line1@tcp/192.168.1.10:7447");
}
