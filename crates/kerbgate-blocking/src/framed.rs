use std::io::{self, Read, Write};

use bytes::BytesMut;

/// Buffered wrapper over a blocking transport stream.
///
/// Reads are synchronous and complete fully or fail; no partial result is
/// ever exposed to callers. Bytes buffered but not consumed (the sniffed
/// dialect window of an unauthenticated session) stay available as
/// leftover for whatever takes the stream over.
pub struct Framed<S> {
    stream: S,
    buf: BytesMut,
}

impl<S> Framed<S> {
    pub fn new(stream: S) -> Self {
        Self::new_with_leftover(stream, BytesMut::new())
    }

    pub fn new_with_leftover(stream: S, leftover: BytesMut) -> Self {
        Self { stream, buf: leftover }
    }

    pub fn into_inner(self) -> (S, BytesMut) {
        (self.stream, self.buf)
    }

    pub fn get_inner_mut(&mut self) -> (&mut S, &mut BytesMut) {
        (&mut self.stream, &mut self.buf)
    }

    /// Bytes buffered but not yet consumed.
    pub fn peek(&self) -> &[u8] {
        &self.buf
    }
}

impl<S> Framed<S>
where
    S: Read,
{
    /// Accumulates at least `length` bytes and consumes exactly `length`
    /// bytes, keeping the leftover in the internal buffer.
    ///
    /// When the stream ends first, the bytes that did arrive remain
    /// buffered (so the caller can report how many were received) and
    /// `UnexpectedEof` is returned.
    pub fn read_exact(&mut self, length: usize) -> io::Result<BytesMut> {
        loop {
            if self.buf.len() >= length {
                return Ok(self.buf.split_to(length));
            }

            let len = self.read()?;

            // Handle EOF
            if len == 0 {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "not enough bytes"));
            }
        }
    }

    /// Buffers up to `length` bytes without consuming any, returning
    /// fewer only when the stream ends first.
    pub fn peek_at_most(&mut self, length: usize) -> io::Result<&[u8]> {
        while self.buf.len() < length {
            if self.read()? == 0 {
                break;
            }
        }

        let available = self.buf.len().min(length);
        Ok(&self.buf[..available])
    }

    /// Reads from stream and fills internal buffer, returning how many bytes were read.
    fn read(&mut self) -> io::Result<usize> {
        let mut read_bytes = [0u8; 1024];
        let len = self.stream.read(&mut read_bytes)?;
        self.buf.extend_from_slice(&read_bytes[..len]);

        Ok(len)
    }
}

impl<S> Framed<S>
where
    S: Write,
{
    /// Attempts to write an entire buffer into this `Framed`’s stream.
    pub fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stream.write_all(buf)
    }
}
