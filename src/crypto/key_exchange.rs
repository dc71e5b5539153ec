//! Key-exchange abstraction shared by the handshake layer.
//!
//! Each algorithm is identified on the wire by a [`QuicTag`], a four-character
//! code packed little-endian into a `u32`. A [`KeyExchangeFactory`] produces
//! fresh ephemeral instances for one handshake attempt each.

use crate::error::Result;
use zeroize::Zeroizing;

/// Four-character wire identifier
pub type QuicTag = u32;

/// Pack four ASCII bytes into a tag, first byte in the least significant position
pub const fn make_quic_tag(a: u8, b: u8, c: u8, d: u8) -> QuicTag {
    u32::from_le_bytes([a, b, c, d])
}

/// Tag for ECDH over NIST P-256
pub const P256_TAG: QuicTag = make_quic_tag(b'P', b'2', b'5', b'6');

/// Render a tag as its four-character code, escaping non-printable bytes
pub fn tag_to_string(tag: QuicTag) -> String {
    tag.to_le_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() {
                (b as char).to_string()
            } else {
                format!("\\x{b:02x}")
            }
        })
        .collect()
}

/// An ephemeral Diffie-Hellman key pair
pub trait KeyExchange: Send + Sync {
    /// Combine our private key with the peer's public value.
    ///
    /// The result is the raw shared secret; key derivation is the caller's job.
    fn calculate_shared_key(&self, peer_public_value: &[u8]) -> Result<Zeroizing<Vec<u8>>>;

    /// Our public value in wire encoding
    fn public_value(&self) -> &[u8];

    /// Wire identifier of the algorithm
    fn tag(&self) -> QuicTag;

    /// Factory producing further instances of the same algorithm
    fn factory(&self) -> &'static dyn KeyExchangeFactory;
}

/// Creates fresh key exchanges for one algorithm
pub trait KeyExchangeFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn KeyExchange>>;

    fn tag(&self) -> QuicTag;
}
