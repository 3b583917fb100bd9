use core::fmt;
use std::io;
use std::net::SocketAddr;

/// Verified identity of an authenticated client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub name: String,
    pub instance: String,
    pub realm: String,
}

impl Principal {
    pub fn new(name: impl Into<String>, instance: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instance: instance.into(),
            realm: realm.into(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance.is_empty() {
            write!(f, "{}@{}", self.name, self.realm)
        } else {
            write!(f, "{}.{}@{}", self.name, self.instance, self.realm)
        }
    }
}

/// Opaque session token minted by the provider on a successful current
/// ticket exchange.
///
/// Required for every seal and unseal call. The token must be released
/// exactly once, on connection teardown, on every path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AuthHandle(u64);

impl AuthHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Byte stream handed to the provider for the additional round trips the
/// current ticket exchange may require (mutual authentication is driven
/// by the provider, not by the acceptor).
pub trait Transport: io::Read + io::Write {}

impl<T> Transport for T where T: io::Read + io::Write {}

/// Failure reported by the authentication provider.
#[derive(Debug)]
pub struct ProviderError {
    reason: String,
    claimed: Option<Principal>,
}

impl ProviderError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            claimed: None,
        }
    }

    /// Attaches the identity fields embedded in a rejected ticket.
    #[must_use]
    pub fn with_claimed_identity(mut self, claimed: Principal) -> Self {
        self.claimed = Some(claimed);
        self
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Identity the rejected ticket claimed to carry, if any.
    ///
    /// This is a claim only: the ticket failed verification, so the
    /// fields must never be recorded as fact.
    pub fn claimed_identity(&self) -> Option<&Principal> {
        self.claimed.as_ref()
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reason)
    }
}

impl std::error::Error for ProviderError {}

/// External cryptographic engine consumed by the handshake and the sealed
/// channel: ticket verification, message sealing and unsealing, session
/// teardown. Ticket formats, key derivation and principal resolution are
/// entirely the provider's business.
pub trait AuthProvider: Send {
    /// Verifies a complete legacy preamble plus the ticket exchange that
    /// follows it on the wire, bound to the peer's network address.
    fn verify_legacy_ticket(&mut self, preamble: &[u8], peer: SocketAddr)
        -> Result<Principal, ProviderError>;

    /// Verifies a length-prefixed current preamble; the provider may
    /// drive additional round trips over `stream` itself.
    ///
    /// On success the returned handle is bound to the negotiated session
    /// keys and enables [`seal`](Self::seal) and [`unseal`](Self::unseal).
    fn verify_current_ticket(
        &mut self,
        preamble: &[u8],
        stream: &mut dyn Transport,
    ) -> Result<(Principal, AuthHandle), ProviderError>;

    /// Encrypts and integrity-protects `plaintext` under the session keys
    /// bound to `handle`.
    fn seal(&mut self, handle: AuthHandle, plaintext: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Reverses [`seal`](Self::seal); fails on any integrity violation.
    fn unseal(&mut self, handle: AuthHandle, ciphertext: &[u8]) -> Result<Vec<u8>, ProviderError>;

    /// Releases the session state bound to `handle`.
    fn release(&mut self, handle: AuthHandle);
}

kerbgate_pdu::assert_obj_safe!(AuthProvider);
