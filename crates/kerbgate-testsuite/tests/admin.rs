use std::net::IpAddr;

use kerbgate_blocking::{
    exit_code, serve_admin, ChannelError, ChannelErrorExt as _, ChannelErrorKind, CommandDispatcher,
    DispatchError,
};
use kerbgate_testsuite::mock::{
    peer_addr, MockProvider, MockResolver, TestStream, MOCK_HANDLE, MUTUAL_ACK, SEAL_MASK,
};
use kerbgate_testsuite::wire;
use pretty_assertions::assert_eq;

struct EchoDispatcher;

impl CommandDispatcher for EchoDispatcher {
    fn dispatch(&mut self, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let mut response = b"ok: ".to_vec();
        response.extend_from_slice(request);
        Ok(response)
    }
}

struct RefusingDispatcher;

impl CommandDispatcher for RefusingDispatcher {
    fn dispatch(&mut self, _request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        Err(DispatchError::new("unknown command"))
    }
}

fn resolver() -> MockResolver {
    MockResolver {
        reverse: Some("kadmin.example.org".to_owned()),
        forward: Some(vec![IpAddr::from([203, 0, 113, 7])]),
    }
}

#[test]
fn full_session_round_trip() {
    let mut input = wire::current_preamble();
    input.extend_from_slice(&wire::sealed_frame(b"get alice"));

    let mut stream = TestStream::new(input);
    let mut provider = MockProvider::new();
    let mut dispatcher = EchoDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    assert!(result.is_ok());
    assert_eq!(exit_code(&result), 0);
    assert_eq!(provider.released, [MOCK_HANDLE]);

    // Mutual authentication ack, then exactly one sealed response frame.
    assert_eq!(stream.written[0], MUTUAL_ACK);
    assert_eq!(stream.written[1..5], [0, 0, 0, 13]);
    let response: Vec<u8> = stream.written[5..].iter().map(|b| b ^ SEAL_MASK).collect();
    assert_eq!(response, b"ok: get alice");
}

#[test]
fn session_with_no_requests_closes_gracefully() {
    let mut stream = TestStream::new(wire::current_preamble());
    let mut provider = MockProvider::new();
    let mut dispatcher = EchoDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    assert!(result.is_ok());
    assert_eq!(provider.released, [MOCK_HANDLE]);
}

#[test]
fn dispatch_failure_ends_the_session_and_releases_the_handle() {
    let mut input = wire::current_preamble();
    input.extend_from_slice(&wire::sealed_frame(b"bogus"));

    let mut stream = TestStream::new(input);
    let mut provider = MockProvider::new();
    let mut dispatcher = RefusingDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    let e = result.as_ref().unwrap_err();
    assert!(matches!(e.kind(), ChannelErrorKind::Dispatch(_)));
    assert_eq!(exit_code(&result), 1);
    assert_eq!(provider.released, [MOCK_HANDLE]);
}

#[test]
fn truncated_request_ends_the_session_and_releases_the_handle() {
    let mut input = wire::current_preamble();
    input.extend_from_slice(&[0, 0]);

    let mut stream = TestStream::new(input);
    let mut provider = MockProvider::new();
    let mut dispatcher = EchoDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    let e = result.as_ref().unwrap_err();
    assert!(matches!(e.kind(), ChannelErrorKind::Decode(_)));
    assert_eq!(provider.released, [MOCK_HANDLE]);
}

#[test]
fn handshake_failure_never_mints_a_handle() {
    let mut stream = TestStream::new(b"USER alice\r\n".to_vec());
    let mut provider = MockProvider::new();
    let mut dispatcher = EchoDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    let e = result.as_ref().unwrap_err();
    assert!(matches!(e.kind(), ChannelErrorKind::Acceptor(_)));
    assert_eq!(exit_code(&result), 1);
    assert!(provider.released.is_empty());
}

#[test]
fn legacy_exchange_cannot_administer() {
    // A legacy session carries no sealing keys; the channel refuses it.
    let mut stream = TestStream::new(wire::legacy_preamble());
    let mut provider = MockProvider::new();
    let mut dispatcher = EchoDispatcher;

    let result = serve_admin(&mut stream, peer_addr(), &resolver(), &mut provider, &mut dispatcher);

    let e = result.as_ref().unwrap_err();
    assert!(matches!(e.kind(), ChannelErrorKind::General));
    assert!(provider.released.is_empty());
}

#[test]
fn exit_code_maps_results() {
    assert_eq!(exit_code(&Ok(())), 0);
    assert_eq!(exit_code(&Err(ChannelError::general("session failed"))), 1);
}
