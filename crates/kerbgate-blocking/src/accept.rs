use std::io::{self, Read, Write};

use bytes::BytesMut;
use kerbgate_acceptor::{
    custom_err, AcceptedSession, Acceptor, AcceptorError, AcceptorErrorExt as _, AcceptorResult, AuthProvider,
};
use kerbgate_pdu::{sendauth, DecodeError, DecodeErrorExt as _};

use crate::framed::Framed;

/// Runs the handshake state machine against a live connection.
///
/// On success the accepted session is returned and `framed` still holds
/// any leftover bytes (for the unauthenticated dialect, the sniffed
/// window itself) for the command loop that takes over. On failure the
/// machine is in its terminal `Failed` state and the caller must tear the
/// connection down; nothing here retries.
pub fn accept<S>(
    framed: &mut Framed<S>,
    acceptor: &mut Acceptor,
    provider: &mut dyn AuthProvider,
) -> AcceptorResult<AcceptedSession>
where
    S: Read + Write,
{
    debug!(peer = %acceptor.peer(), "begin handshake procedure");

    let window = framed
        .peek_at_most(sendauth::SNIFF_WINDOW_SIZE)
        .map_err(|e| custom_err!("peek dialect window", e))?;

    let dialect = acceptor.sniff(window)?;

    debug!(?dialect, state = acceptor.state().name(), "dialect classified");

    loop {
        if let Some(session) = acceptor.get_result() {
            info!(peer = %acceptor.peer(), "handshake complete");
            return Ok(session);
        }

        let Some(hint) = acceptor.next_read_hint() else {
            return Err(kerbgate_acceptor::general_err!("handshake cannot make progress"));
        };

        let preamble = if hint > 0 {
            framed.read_exact(hint).map_err(|e| read_err(framed, hint, e))?
        } else {
            Default::default()
        };

        let (stream, leftover) = framed.get_inner_mut();
        let mut transport = LeftoverStream { leftover, stream };

        acceptor.exchange(&preamble, &mut transport, provider)?;
    }
}

/// Transport view handed to the provider for its round trips: bytes the
/// client pipelined behind the preamble are already sitting in the
/// `Framed` buffer and must be drained before the underlying stream.
struct LeftoverStream<'a, S> {
    leftover: &'a mut BytesMut,
    stream: &'a mut S,
}

impl<S> Read for LeftoverStream<'_, S>
where
    S: Read,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.leftover.is_empty() {
            let length = self.leftover.len().min(buf.len());
            let bytes = self.leftover.split_to(length);
            buf[..length].copy_from_slice(&bytes);
            return Ok(length);
        }

        self.stream.read(buf)
    }
}

impl<S> Write for LeftoverStream<'_, S>
where
    S: Write,
{
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

fn read_err<S>(framed: &Framed<S>, expected: usize, e: io::Error) -> AcceptorError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        AcceptorError::decode(DecodeError::short_read(
            "read preamble",
            framed.peek().len(),
            expected,
        ))
    } else {
        custom_err!("read preamble", e)
    }
}
