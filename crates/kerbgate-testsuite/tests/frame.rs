use kerbgate_pdu::{
    decode_frame, encode_frame, DecodeErrorKind, ReadCursor, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn maximum_sized_frame_round_trips() {
    let payload = vec![0xab; DEFAULT_MAX_FRAME_SIZE];

    let mut encoded = Vec::new();
    encode_frame(&payload, DEFAULT_MAX_FRAME_SIZE, &mut encoded).unwrap();
    assert_eq!(encoded.len(), FRAME_HEADER_SIZE + DEFAULT_MAX_FRAME_SIZE);

    let mut cursor = ReadCursor::new(&encoded);
    let decoded = decode_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).unwrap();
    assert_eq!(decoded, payload.as_slice());
}

#[rstest]
#[case::one_over(1025)]
#[case::huge(u32::MAX)]
fn oversized_announcement_is_rejected(#[case] announced: u32) {
    let encoded = announced.to_be_bytes();

    let mut cursor = ReadCursor::new(&encoded);
    let e = decode_frame(&mut cursor, DEFAULT_MAX_FRAME_SIZE).unwrap_err();

    let expected = announced as usize;
    assert!(matches!(
        e.kind(),
        DecodeErrorKind::FrameTooLarge { length, max: 1024 } if *length == expected
    ));
}

#[test]
fn custom_maximum_is_honored() {
    let mut encoded = Vec::new();
    encode_frame(b"0123456789abcdef", 16, &mut encoded).unwrap();

    let mut cursor = ReadCursor::new(&encoded);
    assert!(decode_frame(&mut cursor, 16).is_ok());

    let mut cursor = ReadCursor::new(&encoded);
    let e = decode_frame(&mut cursor, 15).unwrap_err();
    assert!(matches!(e.kind(), DecodeErrorKind::FrameTooLarge { length: 16, max: 15 }));
}
