use crate::cursor::ReadCursor;
use crate::error::{DecodeError, DecodeErrorExt as _, DecodeResult, EncodeError, EncodeErrorExt as _, EncodeResult};

/// Number of bytes in the length prefix of a frame.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Default maximum payload size of a single frame.
///
/// Matches the fixed 1024-byte message buffers of the historical
/// administration daemons; a peer announcing more than this is
/// misbehaving and the connection must be torn down.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024;

/// Length prefix of a sealed message frame.
///
/// The invariant `length <= max_payload` is established at decode time,
/// before any buffer for the payload exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: usize,
}

impl FrameHeader {
    const NAME: &'static str = "FrameHeader";

    pub fn decode(src: &mut ReadCursor<'_>, max_payload: usize) -> DecodeResult<Self> {
        ensure_size!(ctx: Self::NAME, in: src, size: FRAME_HEADER_SIZE);

        let length = usize::try_from(src.read_u32_be()).expect("u32 always fits in usize");

        if length > max_payload {
            return Err(DecodeError::frame_too_large(Self::NAME, length, max_payload));
        }

        Ok(Self { length })
    }
}

/// Encodes `payload` as a single length-prefixed frame appended to `dst`.
pub fn encode_frame(payload: &[u8], max_payload: usize, dst: &mut Vec<u8>) -> EncodeResult<()> {
    if payload.len() > max_payload {
        return Err(EncodeError::frame_too_large("Frame", payload.len(), max_payload));
    }

    let length = u32::try_from(payload.len())
        .map_err(|_| EncodeError::frame_too_large("Frame", payload.len(), max_payload))?;

    dst.reserve(FRAME_HEADER_SIZE + payload.len());
    dst.extend_from_slice(&length.to_be_bytes());
    dst.extend_from_slice(payload);

    Ok(())
}

/// Decodes a complete in-memory frame, returning its payload.
pub fn decode_frame<'a>(src: &mut ReadCursor<'a>, max_payload: usize) -> DecodeResult<&'a [u8]> {
    let header = FrameHeader::decode(src, max_payload)?;
    ensure_size!(ctx: "Frame", in: src, size: header.length);
    Ok(src.read_slice(header.length))
}
