//! Version markers opening the ticket-exchange preambles.
//!
//! A connecting client announces its authentication dialect with the very
//! first bytes it sends; there is no server-chosen tag in front of them.
//! The legacy dialect opens with a bare eight-byte version string, while
//! the current dialect sends its version string behind a four-byte
//! big-endian length prefix. Four bytes are therefore enough to tell the
//! two apart (or to conclude that no handshake is being attempted).

use crate::error::{DecodeError, DecodeErrorExt as _, DecodeResult};

/// Number of bytes sniffed from a fresh connection to classify its dialect.
pub const SNIFF_WINDOW_SIZE: usize = 4;

/// Version string opening a legacy (protocol version 4) ticket exchange.
pub const LEGACY_VERSION: [u8; 8] = *b"AUTHV0.1";

/// Version string of the current (protocol version 5) ticket exchange.
///
/// Sent length-prefixed; the trailing NUL is part of the marker.
pub const CURRENT_VERSION: [u8; 19] = *b"KRB5_SENDAUTH_V1.0\0";

/// Checks a complete legacy preamble against [`LEGACY_VERSION`].
pub fn validate_legacy_preamble(preamble: &[u8]) -> DecodeResult<()> {
    if preamble != LEGACY_VERSION {
        return Err(DecodeError::invalid_field(
            "LegacyPreamble",
            "version",
            "legacy version marker mismatch",
        ));
    }

    Ok(())
}

/// Checks the payload of a length-prefixed current preamble against [`CURRENT_VERSION`].
pub fn validate_current_preamble(payload: &[u8]) -> DecodeResult<()> {
    if payload != CURRENT_VERSION {
        return Err(DecodeError::invalid_field(
            "CurrentPreamble",
            "version",
            "current version marker mismatch",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_version_length_matches_its_prefix() {
        // The sniffer relies on the length prefix (19) being distinct
        // from the first four bytes of the legacy marker.
        assert_eq!(CURRENT_VERSION.len(), 19);
        assert_ne!(19u32.to_be_bytes(), [b'A', b'U', b'T', b'H']);
    }

    #[test]
    fn exact_markers_validate() {
        validate_legacy_preamble(&LEGACY_VERSION).unwrap();
        validate_current_preamble(&CURRENT_VERSION).unwrap();
    }

    #[test]
    fn near_miss_markers_are_rejected() {
        validate_legacy_preamble(b"AUTHV0.2").unwrap_err();
        validate_legacy_preamble(b"AUTH").unwrap_err();
        validate_current_preamble(b"KRB5_SENDAUTH_V1.0").unwrap_err(); // missing NUL
    }
}
