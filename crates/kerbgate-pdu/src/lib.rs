#![doc = include_str!("../README.md")]

#[macro_use]
mod macros;

mod cursor;
mod error;
mod frame;
pub mod sendauth;

pub use self::cursor::ReadCursor;
pub use self::error::{
    DecodeError, DecodeErrorExt, DecodeErrorKind, DecodeResult, EncodeError, EncodeErrorExt, EncodeErrorKind,
    EncodeResult,
};
pub use self::frame::{decode_frame, encode_frame, FrameHeader, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE};
