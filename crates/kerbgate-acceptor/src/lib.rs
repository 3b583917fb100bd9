#![doc = include_str!("../README.md")]

#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

mod client_name;
mod dialect;
mod handshake;
mod provider;

use core::fmt;

pub use self::client_name::{resolve_client, ClientLabel, NameResolver, SystemResolver};
pub use self::dialect::{classify, Dialect, Sniff};
pub use self::handshake::{
    AcceptedSession, Acceptor, AcceptorState, AuthOutcome, AuthPolicy, ProtocolVersion,
};
pub use self::provider::{AuthHandle, AuthProvider, Principal, ProviderError, Transport};

pub type AcceptorResult<T> = Result<T, AcceptorError>;

#[non_exhaustive]
#[derive(Debug)]
pub enum AcceptorErrorKind {
    /// Preamble bytes failed to parse.
    Decode(kerbgate_pdu::DecodeError),
    /// The provider rejected the presented ticket.
    Provider(ProviderError),
    /// The byte stream matched a dialect marker but the rest of the
    /// preamble did not follow the dialect's layout.
    MalformedHandshake,
    /// No recognized handshake arrived and policy forbids anonymous sessions.
    AuthenticationRequired,
    General,
    Custom,
}

impl fmt::Display for AcceptorErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            AcceptorErrorKind::Decode(_) => write!(f, "decode error"),
            AcceptorErrorKind::Provider(_) => write!(f, "authentication failed"),
            AcceptorErrorKind::MalformedHandshake => write!(f, "malformed handshake"),
            AcceptorErrorKind::AuthenticationRequired => write!(f, "authentication required"),
            AcceptorErrorKind::General => write!(f, "general error"),
            AcceptorErrorKind::Custom => write!(f, "custom error"),
        }
    }
}

impl std::error::Error for AcceptorErrorKind {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self {
            AcceptorErrorKind::Decode(e) => Some(e),
            AcceptorErrorKind::Provider(e) => Some(e),
            AcceptorErrorKind::MalformedHandshake => None,
            AcceptorErrorKind::AuthenticationRequired => None,
            AcceptorErrorKind::General => None,
            AcceptorErrorKind::Custom => None,
        }
    }
}

pub type AcceptorError = kerbgate_error::Error<AcceptorErrorKind>;

pub trait AcceptorErrorExt {
    fn decode(error: kerbgate_pdu::DecodeError) -> Self;
    fn provider(context: &'static str, error: ProviderError) -> Self;
    fn malformed_handshake(context: &'static str) -> Self;
    fn authentication_required(context: &'static str) -> Self;
    fn general(context: &'static str) -> Self;
    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: std::error::Error + Sync + Send + 'static;
}

impl AcceptorErrorExt for AcceptorError {
    fn decode(error: kerbgate_pdu::DecodeError) -> Self {
        Self::new("decode error", AcceptorErrorKind::Decode(error))
    }

    fn provider(context: &'static str, error: ProviderError) -> Self {
        Self::new(context, AcceptorErrorKind::Provider(error))
    }

    fn malformed_handshake(context: &'static str) -> Self {
        Self::new(context, AcceptorErrorKind::MalformedHandshake)
    }

    fn authentication_required(context: &'static str) -> Self {
        Self::new(context, AcceptorErrorKind::AuthenticationRequired)
    }

    fn general(context: &'static str) -> Self {
        Self::new(context, AcceptorErrorKind::General)
    }

    fn custom<E>(context: &'static str, e: E) -> Self
    where
        E: std::error::Error + Sync + Send + 'static,
    {
        Self::new(context, AcceptorErrorKind::Custom).with_source(e)
    }
}

pub trait AcceptorResultExt {
    #[must_use]
    fn with_context(self, context: &'static str) -> Self;
}

impl<T> AcceptorResultExt for AcceptorResult<T> {
    fn with_context(self, context: &'static str) -> Self {
        self.map_err(|mut e| {
            e.context = context;
            e
        })
    }
}
