use core::mem;
use std::net::SocketAddr;

use kerbgate_pdu::{ensure_size, sendauth, FrameHeader, ReadCursor, FRAME_HEADER_SIZE};

use crate::dialect::{classify, Dialect, Sniff};
use crate::provider::{AuthHandle, AuthProvider, Principal, Transport};
use crate::{AcceptorError, AcceptorErrorExt as _, AcceptorResult};

/// Whether a connection may proceed without a ticket exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Every connection must complete a ticket exchange; anything else is
    /// fatally rejected. The administration daemon always runs this way.
    Required,
    /// A connection which does not open with a recognized handshake
    /// proceeds anonymously. The mail daemon's default when no
    /// authentication flag was requested.
    AllowAnonymous,
}

/// Protocol version negotiated by a successful ticket exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolVersion {
    V4,
    V5,
}

/// Authentication outcome recorded in a completed session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    Anonymous,
    Authenticated(Principal),
}

/// Result of a completed handshake.
#[derive(Debug)]
pub struct AcceptedSession {
    pub outcome: AuthOutcome,
    pub version: Option<ProtocolVersion>,
    /// Present only after a current ticket exchange; prerequisite for the
    /// sealed channel.
    pub handle: Option<AuthHandle>,
}

impl AcceptedSession {
    pub fn principal(&self) -> Option<&Principal> {
        match &self.outcome {
            AuthOutcome::Authenticated(principal) => Some(principal),
            AuthOutcome::Anonymous => None,
        }
    }
}

#[derive(Debug, Default)]
pub enum AcceptorState {
    #[default]
    Consumed,

    /// Waiting for the initial byte window.
    Sniff,
    /// Legacy marker candidate seen; the full eight-byte preamble is due.
    LegacyExchange,
    /// Current length prefix seen; the prefixed version string is due.
    CurrentExchange {
        length: usize,
    },
    /// Policy permits an anonymous session; nothing more to read.
    Unauthenticated,
    Authenticated {
        session: AcceptedSession,
    },
    Failed,
}

impl AcceptorState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Consumed => "Consumed",
            Self::Sniff => "Sniff",
            Self::LegacyExchange => "LegacyExchange",
            Self::CurrentExchange { .. } => "CurrentExchange",
            Self::Unauthenticated => "Unauthenticated",
            Self::Authenticated { .. } => "Authenticated",
            Self::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Authenticated { .. } | Self::Failed)
    }
}

/// Server-side handshake state machine.
///
/// Owns no I/O: a blocking driver peeks the sniff window, feeds it to
/// [`sniff`](Self::sniff), then reads the byte count reported by
/// [`next_read_hint`](Self::next_read_hint) and passes it to
/// [`exchange`](Self::exchange) together with the raw stream and the
/// authentication provider. A failed exchange leaves the machine in the
/// terminal `Failed` state; there is no retry and no downgrade, the
/// caller must tear the connection down.
pub struct Acceptor {
    state: AcceptorState,
    policy: AuthPolicy,
    peer: SocketAddr,
}

impl Acceptor {
    pub fn new(policy: AuthPolicy, peer: SocketAddr) -> Self {
        Self {
            state: AcceptorState::Sniff,
            policy,
            peer,
        }
    }

    pub fn state(&self) -> &AcceptorState {
        &self.state
    }

    pub fn policy(&self) -> AuthPolicy {
        self.policy
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Number of preamble bytes the driver must consume from the stream
    /// and feed to the next [`exchange`](Self::exchange) call, or `None`
    /// once the machine cannot make further progress.
    ///
    /// For the legacy dialect the count includes the sniffed window (the
    /// window bytes are the opening of the preamble itself); for the
    /// current dialect it includes the four-byte length prefix.
    pub fn next_read_hint(&self) -> Option<usize> {
        match &self.state {
            AcceptorState::Sniff => Some(sendauth::SNIFF_WINDOW_SIZE),
            AcceptorState::LegacyExchange => Some(sendauth::LEGACY_VERSION.len()),
            AcceptorState::CurrentExchange { length } => Some(FRAME_HEADER_SIZE + length),
            AcceptorState::Unauthenticated => Some(0),
            AcceptorState::Consumed | AcceptorState::Authenticated { .. } | AcceptorState::Failed => None,
        }
    }

    /// Classifies the initial byte window of the connection.
    ///
    /// The window is peeked, not consumed: when the outcome is
    /// [`Dialect::None`] the bytes belong to the command stream that
    /// follows. A window shorter than four bytes means the stream ended
    /// before any handshake could begin; that is fatal under
    /// [`AuthPolicy::Required`] and an anonymous session otherwise.
    pub fn sniff(&mut self, window: &[u8]) -> AcceptorResult<Dialect> {
        if !matches!(self.state, AcceptorState::Sniff) {
            return Err(general_err!("sniff called out of order"));
        }

        let Ok(window) = <[u8; sendauth::SNIFF_WINDOW_SIZE]>::try_from(window) else {
            return match self.policy {
                AuthPolicy::AllowAnonymous => {
                    self.state = AcceptorState::Unauthenticated;
                    Ok(Dialect::None)
                }
                AuthPolicy::Required => {
                    warn!(peer = %self.peer, received = window.len(), "stream ended before the handshake window");
                    self.state = AcceptorState::Failed;
                    Err(AcceptorError::malformed_handshake("sniff"))
                }
            };
        };

        match classify(window) {
            Sniff::Legacy { .. } => {
                self.state = AcceptorState::LegacyExchange;
                Ok(Dialect::LegacyTicket)
            }
            Sniff::Current { length } => {
                self.state = AcceptorState::CurrentExchange { length };
                Ok(Dialect::CurrentTicket)
            }
            Sniff::None => match self.policy {
                AuthPolicy::AllowAnonymous => {
                    self.state = AcceptorState::Unauthenticated;
                    Ok(Dialect::None)
                }
                AuthPolicy::Required => {
                    warn!(peer = %self.peer, "no recognized handshake and authentication is required");
                    self.state = AcceptorState::Failed;
                    Err(AcceptorError::authentication_required("sniff"))
                }
            },
        }
    }

    /// Drives the dialect-specific ticket exchange.
    ///
    /// `preamble` must hold exactly the bytes reported by
    /// [`next_read_hint`](Self::next_read_hint); `stream` is handed to
    /// the provider for dialects whose verification performs further
    /// round trips.
    pub fn exchange(
        &mut self,
        preamble: &[u8],
        stream: &mut dyn Transport,
        provider: &mut dyn AuthProvider,
    ) -> AcceptorResult<()> {
        match mem::take(&mut self.state) {
            AcceptorState::LegacyExchange => self.exchange_legacy(preamble, provider),
            AcceptorState::CurrentExchange { length } => {
                self.exchange_current(length, preamble, stream, provider)
            }
            AcceptorState::Unauthenticated => {
                debug!(peer = %self.peer, "anonymous session permitted by policy");
                self.state = AcceptorState::Authenticated {
                    session: AcceptedSession {
                        outcome: AuthOutcome::Anonymous,
                        version: None,
                        handle: None,
                    },
                };
                Ok(())
            }
            other => {
                self.state = other;
                Err(general_err!("exchange called out of order"))
            }
        }
    }

    /// Takes the accepted session out of a terminal `Authenticated` state.
    pub fn get_result(&mut self) -> Option<AcceptedSession> {
        match mem::take(&mut self.state) {
            AcceptorState::Authenticated { session } => Some(session),
            previous_state => {
                self.state = previous_state;
                None
            }
        }
    }

    fn exchange_legacy(
        &mut self,
        preamble: &[u8],
        provider: &mut dyn AuthProvider,
    ) -> AcceptorResult<()> {
        if let Err(e) = sendauth::validate_legacy_preamble(preamble) {
            warn!(peer = %self.peer, error = %e, "legacy preamble rejected");
            self.state = AcceptorState::Failed;
            return Err(AcceptorError::malformed_handshake("legacy exchange"));
        }

        match provider.verify_legacy_ticket(preamble, self.peer) {
            Ok(principal) => {
                info!(peer = %self.peer, principal = %principal, "legacy ticket verified");
                self.state = AcceptorState::Authenticated {
                    session: AcceptedSession {
                        outcome: AuthOutcome::Authenticated(principal),
                        version: Some(ProtocolVersion::V4),
                        handle: None,
                    },
                };
                Ok(())
            }
            Err(e) => {
                // The claimed fields come out of a ticket that failed
                // verification; they are audit context, not an identity.
                match e.claimed_identity() {
                    Some(claimed) => warn!(
                        peer = %self.peer,
                        claimed_unverified = %claimed,
                        reason = e.reason(),
                        "legacy ticket rejected"
                    ),
                    None => warn!(peer = %self.peer, reason = e.reason(), "legacy ticket rejected"),
                }
                self.state = AcceptorState::Failed;
                Err(AcceptorError::provider("legacy exchange", e))
            }
        }
    }

    fn exchange_current(
        &mut self,
        length: usize,
        preamble: &[u8],
        stream: &mut dyn Transport,
        provider: &mut dyn AuthProvider,
    ) -> AcceptorResult<()> {
        let mut cursor = ReadCursor::new(preamble);

        let marker = FrameHeader::decode(&mut cursor, length)
            .and_then(|header| {
                ensure_size!(ctx: "CurrentPreamble", in: cursor, size: header.length);
                Ok(cursor.read_slice(header.length))
            })
            .and_then(sendauth::validate_current_preamble);

        if let Err(e) = marker {
            warn!(peer = %self.peer, error = %e, "current preamble rejected");
            self.state = AcceptorState::Failed;
            return Err(AcceptorError::malformed_handshake("current exchange"));
        }

        match provider.verify_current_ticket(preamble, stream) {
            Ok((principal, handle)) => {
                info!(peer = %self.peer, principal = %principal, "current ticket verified");
                self.state = AcceptorState::Authenticated {
                    session: AcceptedSession {
                        outcome: AuthOutcome::Authenticated(principal),
                        version: Some(ProtocolVersion::V5),
                        handle: Some(handle),
                    },
                };
                Ok(())
            }
            Err(e) => {
                warn!(peer = %self.peer, reason = e.reason(), "current ticket rejected");
                self.state = AcceptorState::Failed;
                Err(AcceptorError::provider("current exchange", e))
            }
        }
    }
}
