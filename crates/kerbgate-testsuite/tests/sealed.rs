use kerbgate_acceptor::{AcceptedSession, AuthHandle, AuthOutcome, Principal, ProtocolVersion};
use kerbgate_blocking::{ChannelErrorKind, Framed, SealedChannel};
use kerbgate_pdu::DecodeErrorKind;
use kerbgate_testsuite::mock::{MockProvider, TestStream, SEAL_MASK};
use kerbgate_testsuite::wire;
use pretty_assertions::assert_eq;

fn sealed_session() -> AcceptedSession {
    AcceptedSession {
        outcome: AuthOutcome::Authenticated(Principal::new("admin", "root", "EXAMPLE.ORG")),
        version: Some(ProtocolVersion::V5),
        handle: Some(AuthHandle::new(7)),
    }
}

#[test]
fn bind_refuses_sessions_without_a_handle() {
    let framed = Framed::new(TestStream::new(Vec::new()));
    let session = AcceptedSession {
        outcome: AuthOutcome::Anonymous,
        version: None,
        handle: None,
    };

    let e = SealedChannel::bind(framed, &session).map(|_| ()).unwrap_err();

    assert!(matches!(e.kind(), ChannelErrorKind::General));
}

#[test]
fn send_writes_one_sealed_frame() {
    let framed = Framed::new(TestStream::new(Vec::new()));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    channel.send(&mut provider, b"listprincs").unwrap();

    let (framed, _) = channel.into_inner();
    let (stream, _) = framed.into_inner();

    assert_eq!(&stream.written[..4], [0, 0, 0, 10]);

    let unsealed: Vec<u8> = stream.written[4..].iter().map(|b| b ^ SEAL_MASK).collect();
    assert_eq!(unsealed, b"listprincs");
}

#[test]
fn recv_returns_the_unsealed_payload() {
    let framed = Framed::new(TestStream::new(wire::sealed_frame(b"get alice")));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    let request = channel.recv(&mut provider).unwrap();

    assert_eq!(request.as_deref(), Some(b"get alice".as_slice()));
}

#[test]
fn close_at_a_frame_boundary_ends_the_stream() {
    let framed = Framed::new(TestStream::new(wire::sealed_frame(b"quit")));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    assert!(channel.recv(&mut provider).unwrap().is_some());
    assert!(channel.recv(&mut provider).unwrap().is_none());
}

#[test]
fn close_inside_a_header_is_a_short_read() {
    let framed = Framed::new(TestStream::new(vec![0, 0]));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    let e = channel.recv(&mut provider).unwrap_err();

    match e.kind() {
        ChannelErrorKind::Decode(decode) => assert!(matches!(
            decode.kind(),
            DecodeErrorKind::ShortRead { received: 2, expected: 4 }
        )),
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn close_inside_a_payload_is_a_short_read() {
    let framed = Framed::new(TestStream::new(vec![0, 0, 0, 5, b'a', b'b', b'c']));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    let e = channel.recv(&mut provider).unwrap_err();

    match e.kind() {
        ChannelErrorKind::Decode(decode) => assert!(matches!(
            decode.kind(),
            DecodeErrorKind::ShortRead { received: 3, expected: 5 }
        )),
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn oversized_announcement_is_rejected_before_any_read() {
    // Announces 2048 bytes, more than the 1024-byte channel maximum.
    let framed = Framed::new(TestStream::new(2048u32.to_be_bytes().to_vec()));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider::new();

    let e = channel.recv(&mut provider).unwrap_err();

    match e.kind() {
        ChannelErrorKind::Decode(decode) => assert!(matches!(
            decode.kind(),
            DecodeErrorKind::FrameTooLarge { length: 2048, max: 1024 }
        )),
        other => panic!("unexpected error kind: {other:?}"),
    }
}

#[test]
fn unseal_failure_is_fatal() {
    let framed = Framed::new(TestStream::new(wire::sealed_frame(b"get alice")));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider {
        reject_unseal: true,
        ..MockProvider::new()
    };

    let e = channel.recv(&mut provider).unwrap_err();

    assert!(matches!(e.kind(), ChannelErrorKind::Seal(_)));
}

#[test]
fn seal_failure_writes_nothing() {
    let framed = Framed::new(TestStream::new(Vec::new()));
    let mut channel = SealedChannel::bind(framed, &sealed_session()).unwrap();
    let mut provider = MockProvider {
        reject_seal: true,
        ..MockProvider::new()
    };

    let e = channel.send(&mut provider, b"listprincs").unwrap_err();

    assert!(matches!(e.kind(), ChannelErrorKind::Seal(_)));

    let (framed, _) = channel.into_inner();
    let (stream, _) = framed.into_inner();
    assert!(stream.written.is_empty());
}
