/// A cursor for reading bytes from an in-memory buffer.
///
/// Callers are expected to check remaining length up front (see
/// [`ensure_size!`](crate::ensure_size)); the read methods panic on
/// overrun rather than returning a result.
#[derive(Clone, Debug)]
pub struct ReadCursor<'a> {
    inner: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    /// Create a new `ReadCursor` from a byte slice.
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { inner: bytes, pos: 0 }
    }

    /// Returns the number of bytes remaining.
    #[inline]
    pub const fn len(&self) -> usize {
        self.inner.len() - self.pos
    }

    /// Returns `true` if there are no bytes remaining.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a slice of the remaining bytes without advancing.
    #[inline]
    #[track_caller]
    pub fn remaining(&self) -> &'a [u8] {
        &self.inner[self.pos..]
    }

    /// Returns the current position.
    #[inline]
    pub const fn pos(&self) -> usize {
        self.pos
    }

    /// Reads `n` bytes and advances past them.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `n` bytes remain.
    #[inline]
    #[track_caller]
    pub fn read_slice(&mut self, n: usize) -> &'a [u8] {
        let bytes = &self.inner[self.pos..self.pos + n];
        self.pos += n;
        bytes
    }

    /// Reads a fixed-size array and advances past it.
    ///
    /// # Panics
    ///
    /// Panics if fewer than `N` bytes remain.
    #[inline]
    #[track_caller]
    pub fn read_array<const N: usize>(&mut self) -> [u8; N] {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_slice(N));
        array
    }

    /// Reads a big-endian `u32` and advances past it.
    ///
    /// # Panics
    ///
    /// Panics if fewer than 4 bytes remain.
    #[inline]
    #[track_caller]
    pub fn read_u32_be(&mut self) -> u32 {
        u32::from_be_bytes(self.read_array::<4>())
    }
}
