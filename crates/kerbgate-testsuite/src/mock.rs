//! Scripted stand-ins for the external collaborators: the authentication
//! provider, the name service, the command dispatcher and the transport.

use std::io::{self, Read, Write};
use std::net::{IpAddr, SocketAddr};

use kerbgate_acceptor::{AuthHandle, AuthProvider, NameResolver, Principal, ProviderError, Transport};

/// Byte every mock seal/unseal XORs the payload with.
pub const SEAL_MASK: u8 = 0x5a;

/// Acknowledgement byte the mock provider writes during the current
/// exchange, standing in for the mutual-authentication reply.
pub const MUTUAL_ACK: u8 = 0x06;

/// Handle the mock provider mints for every current exchange.
pub const MOCK_HANDLE: AuthHandle = AuthHandle::new(7);

/// Scripted authentication provider.
///
/// Failure switches select the rejection paths; `released` records every
/// release call so tests can assert the exactly-once teardown contract.
#[derive(Default)]
pub struct MockProvider {
    pub reject_legacy: bool,
    pub reject_current: bool,
    pub reject_seal: bool,
    pub reject_unseal: bool,
    /// Identity claim embedded in rejected legacy tickets.
    pub claimed: Option<Principal>,
    pub released: Vec<AuthHandle>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthProvider for MockProvider {
    fn verify_legacy_ticket(
        &mut self,
        _preamble: &[u8],
        _peer: SocketAddr,
    ) -> Result<Principal, ProviderError> {
        if self.reject_legacy {
            let mut e = ProviderError::new("ticket expired");
            if let Some(claimed) = self.claimed.clone() {
                e = e.with_claimed_identity(claimed);
            }
            return Err(e);
        }

        Ok(Principal::new("alice", "", "EXAMPLE.ORG"))
    }

    fn verify_current_ticket(
        &mut self,
        _preamble: &[u8],
        stream: &mut dyn Transport,
    ) -> Result<(Principal, AuthHandle), ProviderError> {
        if self.reject_current {
            return Err(ProviderError::new("mutual authentication failed"));
        }

        // The real exchange answers the client before the session is up.
        stream
            .write_all(&[MUTUAL_ACK])
            .map_err(|e| ProviderError::new(e.to_string()))?;

        Ok((Principal::new("admin", "root", "EXAMPLE.ORG"), MOCK_HANDLE))
    }

    fn seal(&mut self, _handle: AuthHandle, plaintext: &[u8]) -> Result<Vec<u8>, ProviderError> {
        if self.reject_seal {
            return Err(ProviderError::new("stale session key"));
        }

        Ok(plaintext.iter().map(|b| b ^ SEAL_MASK).collect())
    }

    fn unseal(&mut self, _handle: AuthHandle, ciphertext: &[u8]) -> Result<Vec<u8>, ProviderError> {
        if self.reject_unseal {
            return Err(ProviderError::new("integrity check failed"));
        }

        Ok(ciphertext.iter().map(|b| b ^ SEAL_MASK).collect())
    }

    fn release(&mut self, handle: AuthHandle) {
        self.released.push(handle);
    }
}

/// Scripted name service: `None` stands for a failed lookup.
#[derive(Clone, Debug, Default)]
pub struct MockResolver {
    pub reverse: Option<String>,
    pub forward: Option<Vec<IpAddr>>,
}

impl NameResolver for MockResolver {
    fn reverse(&self, _addr: IpAddr) -> io::Result<String> {
        self.reverse
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no PTR record"))
    }

    fn forward(&self, _name: &str) -> io::Result<Vec<IpAddr>> {
        self.forward
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no A record"))
    }
}

/// In-memory transport: reads consume a scripted input, writes accumulate
/// for inspection.
#[derive(Debug, Default)]
pub struct TestStream {
    input: io::Cursor<Vec<u8>>,
    pub written: Vec<u8>,
}

impl TestStream {
    pub fn new(input: Vec<u8>) -> Self {
        Self {
            input: io::Cursor::new(input),
            written: Vec::new(),
        }
    }
}

impl Read for TestStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.input.read(buf)
    }
}

impl Write for TestStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Test peer address used throughout the suite.
pub fn peer_addr() -> SocketAddr {
    "203.0.113.7:40614".parse().expect("valid socket address")
}
