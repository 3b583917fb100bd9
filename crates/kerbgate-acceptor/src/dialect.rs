use kerbgate_pdu::sendauth;

/// Authentication dialect spoken by a connecting client.
///
/// Determined once per connection from the sniffed window; immutable
/// afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Bare eight-byte legacy version exchange (protocol version 4).
    LegacyTicket,
    /// Length-prefixed current version exchange (protocol version 5).
    CurrentTicket,
    /// No handshake; the sniffed bytes belong to the command stream.
    None,
}

/// Classification of the initial byte window of a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sniff {
    /// The window opens the legacy version string; `remaining` more
    /// preamble bytes complete it.
    Legacy { remaining: usize },
    /// The window is a big-endian length prefix announcing the current
    /// version string of `length` bytes.
    Current { length: usize },
    /// Neither marker.
    None,
}

impl Sniff {
    pub fn dialect(self) -> Dialect {
        match self {
            Sniff::Legacy { .. } => Dialect::LegacyTicket,
            Sniff::Current { .. } => Dialect::CurrentTicket,
            Sniff::None => Dialect::None,
        }
    }
}

/// Classifies the first four bytes of a connection.
///
/// Total and deterministic: every window maps to exactly one outcome,
/// checked in order, first match wins. The window is only a candidate
/// match; the full version marker is verified by the handshake once the
/// remaining preamble bytes arrive.
pub fn classify(window: [u8; sendauth::SNIFF_WINDOW_SIZE]) -> Sniff {
    if window == sendauth::LEGACY_VERSION[..sendauth::SNIFF_WINDOW_SIZE] {
        Sniff::Legacy {
            remaining: sendauth::LEGACY_VERSION.len() - sendauth::SNIFF_WINDOW_SIZE,
        }
    } else if u32::from_be_bytes(window) as usize == sendauth::CURRENT_VERSION.len() {
        Sniff::Current {
            length: sendauth::CURRENT_VERSION.len(),
        }
    } else {
        Sniff::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_window_is_classified() {
        assert_eq!(classify(*b"AUTH"), Sniff::Legacy { remaining: 4 });
    }

    #[test]
    fn current_window_is_classified() {
        assert_eq!(classify([0, 0, 0, 19]), Sniff::Current { length: 19 });
    }

    #[test]
    fn anything_else_is_none() {
        assert_eq!(classify(*b"USER"), Sniff::None);
        assert_eq!(classify([0, 0, 0, 18]), Sniff::None);
        assert_eq!(classify([0, 0, 0, 20]), Sniff::None);
        assert_eq!(classify([0xff; 4]), Sniff::None);
        assert_eq!(classify([0; 4]), Sniff::None);
    }
}
