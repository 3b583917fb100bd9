//! Builders for the byte sequences a client puts on the wire.

use kerbgate_pdu::sendauth;

use crate::mock::SEAL_MASK;

/// Complete eight-byte legacy handshake preamble.
pub fn legacy_preamble() -> Vec<u8> {
    sendauth::LEGACY_VERSION.to_vec()
}

/// Complete current handshake preamble: length prefix plus version string.
pub fn current_preamble() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(4 + sendauth::CURRENT_VERSION.len());
    bytes.extend_from_slice(&u32::to_be_bytes(sendauth::CURRENT_VERSION.len() as u32));
    bytes.extend_from_slice(&sendauth::CURRENT_VERSION);
    bytes
}

/// Length-prefixed frame carrying `plaintext` sealed the way
/// [`MockProvider`](crate::mock::MockProvider) seals.
pub fn sealed_frame(plaintext: &[u8]) -> Vec<u8> {
    let sealed: Vec<u8> = plaintext.iter().map(|b| b ^ SEAL_MASK).collect();

    let mut bytes = Vec::with_capacity(4 + sealed.len());
    bytes.extend_from_slice(&u32::to_be_bytes(sealed.len() as u32));
    bytes.extend_from_slice(&sealed);
    bytes
}
