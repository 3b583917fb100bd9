use std::io::{self, Read, Write};

use kerbgate_acceptor::{AcceptedSession, AuthHandle, AuthProvider};
use kerbgate_pdu::{
    DecodeError, DecodeErrorExt as _, FrameHeader, ReadCursor, DEFAULT_MAX_FRAME_SIZE, FRAME_HEADER_SIZE,
};

use crate::framed::Framed;
use crate::{ChannelError, ChannelErrorExt as _, ChannelResult};

/// Sealed message channel carrying administration requests and responses
/// over an untrusted transport.
///
/// Every message on the wire is a 4-byte big-endian length prefix
/// followed by that many bytes of sealed payload. Each send or receive
/// performs exactly one logical transport operation; nothing is buffered
/// across messages and no failure is retried.
pub struct SealedChannel<S> {
    framed: Framed<S>,
    handle: AuthHandle,
    max_frame_size: usize,
}

impl<S> SealedChannel<S> {
    /// Binds a sealed channel to an authenticated session.
    ///
    /// Fails when the session carries no authentication handle: anonymous
    /// sessions and legacy exchanges never establish sealing keys, and a
    /// failed handshake never produces a session at all.
    pub fn bind(framed: Framed<S>, session: &AcceptedSession) -> ChannelResult<Self> {
        let Some(handle) = session.handle else {
            return Err(ChannelError::general("session has no authentication handle"));
        };

        Ok(Self {
            framed,
            handle,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        })
    }

    #[must_use]
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    pub fn handle(&self) -> AuthHandle {
        self.handle
    }

    pub fn into_inner(self) -> (Framed<S>, AuthHandle) {
        (self.framed, self.handle)
    }
}

impl<S> SealedChannel<S>
where
    S: Write,
{
    /// Seals `plaintext` and writes it as a single length-prefixed frame.
    pub fn send(&mut self, provider: &mut dyn AuthProvider, plaintext: &[u8]) -> ChannelResult<()> {
        let sealed = provider
            .seal(self.handle, plaintext)
            .map_err(|e| ChannelError::seal("seal payload", e))?;

        let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + sealed.len());
        kerbgate_pdu::encode_frame(&sealed, self.max_frame_size, &mut buf).map_err(ChannelError::encode)?;

        trace!(length = sealed.len(), "send sealed frame");

        self.framed
            .write_all(&buf)
            .map_err(|e| ChannelError::custom("write frame", e))
    }
}

impl<S> SealedChannel<S>
where
    S: Read,
{
    /// Reads one length-prefixed frame and unseals its payload.
    ///
    /// Returns `None` when the peer closed the stream at a frame
    /// boundary; a stream ending anywhere inside a frame is a short read
    /// and fatal. The payload either unseals completely or not at all;
    /// nothing partial is ever returned.
    pub fn recv(&mut self, provider: &mut dyn AuthProvider) -> ChannelResult<Option<Vec<u8>>> {
        let header_bytes = match self.framed.read_exact(FRAME_HEADER_SIZE) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                let received = self.framed.peek().len();

                if received == 0 {
                    // Clean close at a frame boundary.
                    return Ok(None);
                }

                return Err(ChannelError::decode(DecodeError::short_read(
                    "frame header",
                    received,
                    FRAME_HEADER_SIZE,
                )));
            }
            Err(e) => return Err(ChannelError::custom("read frame header", e)),
        };

        let mut cursor = ReadCursor::new(&header_bytes);
        let header = FrameHeader::decode(&mut cursor, self.max_frame_size).map_err(ChannelError::decode)?;

        let payload = match self.framed.read_exact(header.length) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ChannelError::decode(DecodeError::short_read(
                    "frame payload",
                    self.framed.peek().len(),
                    header.length,
                )));
            }
            Err(e) => return Err(ChannelError::custom("read frame payload", e)),
        };

        trace!(length = header.length, "received sealed frame");

        let plaintext = provider
            .unseal(self.handle, &payload)
            .map_err(|e| ChannelError::seal("unseal payload", e))?;

        Ok(Some(plaintext))
    }
}
