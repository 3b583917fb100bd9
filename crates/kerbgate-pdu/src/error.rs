use core::fmt;

/// A result type for decoding operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Error produced when parsing bytes off the wire.
pub type DecodeError = kerbgate_error::Error<DecodeErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum DecodeErrorKind {
    /// Fewer bytes arrived than the operation requires.
    ShortRead {
        received: usize,
        expected: usize,
    },
    /// A frame length prefix exceeds the configured maximum payload size.
    ///
    /// The bound is enforced before any allocation or copy; the caller
    /// must treat this as fatal, there is no partial-frame recovery.
    FrameTooLarge {
        length: usize,
        max: usize,
    },
    /// A field holds a value the protocol does not allow.
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },
}

impl std::error::Error for DecodeErrorKind {}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortRead { received, expected } => write!(
                f,
                "short read: received {received} bytes, expected {expected} bytes"
            ),
            Self::FrameTooLarge { length, max } => {
                write!(f, "frame too large: length {length} exceeds maximum {max}")
            }
            Self::InvalidField { field, reason } => {
                write!(f, "invalid `{field}`: {reason}")
            }
        }
    }
}

pub trait DecodeErrorExt {
    fn short_read(context: &'static str, received: usize, expected: usize) -> Self;
    fn frame_too_large(context: &'static str, length: usize, max: usize) -> Self;
    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self;
}

impl DecodeErrorExt for DecodeError {
    fn short_read(context: &'static str, received: usize, expected: usize) -> Self {
        Self::new(context, DecodeErrorKind::ShortRead { received, expected })
    }

    fn frame_too_large(context: &'static str, length: usize, max: usize) -> Self {
        Self::new(context, DecodeErrorKind::FrameTooLarge { length, max })
    }

    fn invalid_field(context: &'static str, field: &'static str, reason: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::InvalidField { field, reason })
    }
}

/// A result type for encoding operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Error produced when writing bytes for the wire.
pub type EncodeError = kerbgate_error::Error<EncodeErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum EncodeErrorKind {
    /// The payload does not fit within the configured maximum frame size.
    FrameTooLarge {
        length: usize,
        max: usize,
    },
}

impl std::error::Error for EncodeErrorKind {}

impl fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FrameTooLarge { length, max } => {
                write!(f, "frame too large: length {length} exceeds maximum {max}")
            }
        }
    }
}

pub trait EncodeErrorExt {
    fn frame_too_large(context: &'static str, length: usize, max: usize) -> Self;
}

impl EncodeErrorExt for EncodeError {
    fn frame_too_large(context: &'static str, length: usize, max: usize) -> Self {
        Self::new(context, EncodeErrorKind::FrameTooLarge { length, max })
    }
}
