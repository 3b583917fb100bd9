#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

mod accept;
mod admin;
mod framed;
mod sealed;

use core::fmt;

use kerbgate_acceptor::{AcceptorError, ProviderError};

pub use self::accept::accept;
pub use self::admin::{exit_code, serve_admin, CommandDispatcher, DispatchError};
pub use self::framed::Framed;
pub use self::sealed::SealedChannel;

pub type ChannelResult<T> = Result<T, ChannelError>;

#[non_exhaustive]
#[derive(Debug)]
pub enum ChannelErrorKind {
    /// A frame failed to parse off the wire.
    Decode(kerbgate_pdu::DecodeError),
    /// A frame could not be produced for the wire.
    Encode(kerbgate_pdu::EncodeError),
    /// The provider failed to seal or unseal a payload.
    Seal(ProviderError),
    /// The command dispatcher rejected a request.
    Dispatch(DispatchError),
    /// The handshake failed before a channel could exist.
    Acceptor(AcceptorError),
    General,
    Custom,
}

impl fmt::Display for ChannelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            ChannelErrorKind::Decode(_) => write!(f, "decode error"),
            ChannelErrorKind::Encode(_) => write!(f, "encode error"),
            ChannelErrorKind::Seal(_) => write!(f, "seal error"),
            ChannelErrorKind::Dispatch(_) => write!(f, "dispatch error"),
            ChannelErrorKind::Acceptor(_) => write!(f, "handshake error"),
            ChannelErrorKind::General => write!(f, "general error"),
            ChannelErrorKind::Custom => write!(f, "custom error"),
        }
    }
}

impl std::error::Error for ChannelErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            ChannelErrorKind::Decode(e) => Some(e),
            ChannelErrorKind::Encode(e) => Some(e),
            ChannelErrorKind::Seal(e) => Some(e),
            ChannelErrorKind::Dispatch(e) => Some(e),
            ChannelErrorKind::Acceptor(e) => Some(e),
            ChannelErrorKind::General => None,
            ChannelErrorKind::Custom => None,
        }
    }
}

pub type ChannelError = kerbgate_error::Error<ChannelErrorKind>;

pub trait ChannelErrorExt {
    fn decode(error: kerbgate_pdu::DecodeError) -> Self;
    fn encode(error: kerbgate_pdu::EncodeError) -> Self;
    fn seal(context: &'static str, error: ProviderError) -> Self;
    fn dispatch(context: &'static str, error: DispatchError) -> Self;
    fn acceptor(error: AcceptorError) -> Self;
    fn general(context: &'static str) -> Self;
    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: std::error::Error + Sync + Send + 'static;
}

impl ChannelErrorExt for ChannelError {
    fn decode(error: kerbgate_pdu::DecodeError) -> Self {
        Self::new("decode error", ChannelErrorKind::Decode(error))
    }

    fn encode(error: kerbgate_pdu::EncodeError) -> Self {
        Self::new("encode error", ChannelErrorKind::Encode(error))
    }

    fn seal(context: &'static str, error: ProviderError) -> Self {
        Self::new(context, ChannelErrorKind::Seal(error))
    }

    fn dispatch(context: &'static str, error: DispatchError) -> Self {
        Self::new(context, ChannelErrorKind::Dispatch(error))
    }

    fn acceptor(error: AcceptorError) -> Self {
        Self::new("handshake error", ChannelErrorKind::Acceptor(error))
    }

    fn general(context: &'static str) -> Self {
        Self::new(context, ChannelErrorKind::General)
    }

    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: std::error::Error + Sync + Send + 'static,
    {
        Self::new(context, ChannelErrorKind::Custom).with_source(e)
    }
}
