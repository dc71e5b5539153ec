//! Ephemeral ECDH over NIST P-256 (secp256r1).
//!
//! Wire formats:
//! - private key: SEC1 `ECPrivateKey` DER (RFC 5915)
//! - public value: uncompressed SEC1 point, `0x04 || X(32) || Y(32)`
//! - shared secret: the 32-byte big-endian x-coordinate of the ECDH point,
//!   with no key derivation applied
//!
//! ```rust
//! use quicwire::crypto::key_exchange::KeyExchange;
//! use quicwire::crypto::p256::P256KeyExchange;
//!
//! let alice = P256KeyExchange::new(&P256KeyExchange::new_private_key()?)?;
//! let bob = P256KeyExchange::generate()?;
//!
//! let a = alice.calculate_shared_key(bob.public_value())?;
//! let b = bob.calculate_shared_key(alice.public_value())?;
//! assert_eq!(a, b);
//! # Ok::<(), quicwire::error::ProtocolError>(())
//! ```

use std::fmt;

use ::p256::ecdh::diffie_hellman;
use ::p256::elliptic_curve::sec1::ToEncodedPoint;
use ::p256::{PublicKey, SecretKey};
use rand_core::{OsRng, RngCore};
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use crate::crypto::key_exchange::{KeyExchange, KeyExchangeFactory, QuicTag, P256_TAG};
use crate::error::{constants, ProtocolError, Result};
use crate::utils::metrics::global_metrics;

/// Length of an uncompressed P-256 point: tag byte plus two coordinates
pub const UNCOMPRESSED_P256_POINT_BYTES: usize = 65;

/// Length of a P-256 field element, and so of the shared secret
pub const P256_FIELD_BYTES: usize = 32;

const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

static FACTORY: P256KeyExchangeFactory = P256KeyExchangeFactory;

/// P-256 key pair with a cached public value
pub struct P256KeyExchange {
    private_key: SecretKey,
    public_key: [u8; UNCOMPRESSED_P256_POINT_BYTES],
}

impl P256KeyExchange {
    /// Import a DER-encoded private key and derive its public point.
    ///
    /// # Errors
    /// `ProtocolError::InvalidPrivateKey` if `key` is empty, is not valid
    /// SEC1 DER, holds a scalar outside `[1, n)`, or embeds a public key that
    /// does not match the scalar.
    #[instrument(skip_all, fields(len = key.len()))]
    pub fn new(key: &[u8]) -> Result<Self> {
        Self::import(key).map_err(|e| {
            global_metrics().key_exchange_failed();
            e
        })
    }

    fn import(key: &[u8]) -> Result<Self> {
        if key.is_empty() {
            debug!("{}", constants::ERR_PRIVATE_KEY_EMPTY);
            return Err(ProtocolError::InvalidPrivateKey(
                constants::ERR_PRIVATE_KEY_EMPTY.into(),
            ));
        }

        let private_key = SecretKey::from_sec1_der(key).map_err(|e| {
            debug!(error = %e, "{}", constants::ERR_PRIVATE_KEY_INVALID);
            ProtocolError::InvalidPrivateKey(constants::ERR_PRIVATE_KEY_INVALID.into())
        })?;

        let encoded = private_key.public_key().to_encoded_point(false);
        let public_key = <[u8; UNCOMPRESSED_P256_POINT_BYTES]>::try_from(encoded.as_bytes())
            .map_err(|_| {
                debug!("{}", constants::ERR_PUBLIC_KEY_UNAVAILABLE);
                ProtocolError::InvalidPrivateKey(constants::ERR_PUBLIC_KEY_UNAVAILABLE.into())
            })?;

        global_metrics().key_exchange_created();
        Ok(Self {
            private_key,
            public_key,
        })
    }

    /// Generate a fresh private key from the OS RNG, DER encoded for [`new`](Self::new).
    ///
    /// # Errors
    /// `ProtocolError::KeyGenerationFailure` if the RNG or the encoder fails.
    pub fn new_private_key() -> Result<Zeroizing<Vec<u8>>> {
        let mut scalar = Zeroizing::new([0u8; P256_FIELD_BYTES]);

        // Out-of-range draws (probability ~2^-32) are simply retried
        let key = loop {
            OsRng.try_fill_bytes(&mut scalar[..]).map_err(|e| {
                debug!(error = %e, "Can't generate a new private key");
                ProtocolError::KeyGenerationFailure(e.to_string())
            })?;
            if let Ok(key) = SecretKey::from_slice(&scalar[..]) {
                break key;
            }
        };

        key.to_sec1_der().map_err(|e| {
            debug!(error = %e, "{}", constants::ERR_KEY_SERIALIZATION);
            ProtocolError::KeyGenerationFailure(constants::ERR_KEY_SERIALIZATION.into())
        })
    }

    /// Shorthand for `new(&new_private_key()?)`
    pub fn generate() -> Result<Self> {
        let private_key = Self::new_private_key()?;
        Self::new(&private_key)
    }

    fn compute_shared_key(&self, peer_public_value: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if peer_public_value.len() != UNCOMPRESSED_P256_POINT_BYTES {
            debug!(len = peer_public_value.len(), "Peer public value is invalid");
            return Err(ProtocolError::InvalidPublicValueLength {
                expected: UNCOMPRESSED_P256_POINT_BYTES,
                actual: peer_public_value.len(),
            });
        }

        if peer_public_value[0] != UNCOMPRESSED_POINT_TAG {
            debug!(tag = peer_public_value[0], "Peer public value is not uncompressed");
            return Err(ProtocolError::InvalidPublicPoint);
        }

        // Decoding checks that the point lies on the curve
        let peer_key = PublicKey::from_sec1_bytes(peer_public_value).map_err(|_| {
            debug!("{}", constants::ERR_PEER_POINT_INVALID);
            ProtocolError::InvalidPublicPoint
        })?;

        let shared = diffie_hellman(self.private_key.to_nonzero_scalar(), peer_key.as_affine());
        let secret = shared.raw_secret_bytes();
        if secret.len() != P256_FIELD_BYTES {
            debug!("{}", constants::ERR_SHARED_KEY_FAILED);
            return Err(ProtocolError::SharedKeyFailure);
        }

        Ok(Zeroizing::new(secret.to_vec()))
    }
}

impl KeyExchange for P256KeyExchange {
    fn calculate_shared_key(&self, peer_public_value: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let result = self.compute_shared_key(peer_public_value);
        match result {
            Ok(_) => global_metrics().shared_key_computed(),
            Err(_) => global_metrics().key_exchange_failed(),
        }
        result
    }

    fn public_value(&self) -> &[u8] {
        &self.public_key
    }

    fn tag(&self) -> QuicTag {
        P256_TAG
    }

    fn factory(&self) -> &'static dyn KeyExchangeFactory {
        &FACTORY
    }
}

impl fmt::Debug for P256KeyExchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("P256KeyExchange")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}

/// Produces one fresh [`P256KeyExchange`] per call
#[derive(Debug, Default, Clone, Copy)]
pub struct P256KeyExchangeFactory;

impl KeyExchangeFactory for P256KeyExchangeFactory {
    fn create(&self) -> Result<Box<dyn KeyExchange>> {
        Ok(Box::new(P256KeyExchange::generate()?))
    }

    fn tag(&self) -> QuicTag {
        P256_TAG
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const GENERATOR_X: [u8; 32] = [
        0x6b, 0x17, 0xd1, 0xf2, 0xe1, 0x2c, 0x42, 0x47, 0xf8, 0xbc, 0xe6, 0xe5, 0x63, 0xa4, 0x40,
        0xf2, 0x77, 0x03, 0x7d, 0x81, 0x2d, 0xeb, 0x33, 0xa0, 0xf4, 0xa1, 0x39, 0x45, 0xd8, 0x98,
        0xc2, 0x96,
    ];
    const GENERATOR_Y: [u8; 32] = [
        0x4f, 0xe3, 0x42, 0xe2, 0xfe, 0x1a, 0x7f, 0x9b, 0x8e, 0xe7, 0xeb, 0x4a, 0x7c, 0x0f, 0x9e,
        0x16, 0x2b, 0xce, 0x33, 0x57, 0x6b, 0x31, 0x5e, 0xce, 0xcb, 0xb6, 0x40, 0x68, 0x37, 0xbf,
        0x51, 0xf5,
    ];

    /// Minimal SEC1 DER wrapping a raw scalar, with the prime256v1 OID
    fn der_for_scalar(scalar: [u8; 32]) -> Vec<u8> {
        let mut der = vec![0x30, 0x31, 0x02, 0x01, 0x01, 0x04, 0x20];
        der.extend_from_slice(&scalar);
        der.extend_from_slice(&[
            0xa0, 0x0a, 0x06, 0x08, 0x2a, 0x86, 0x48, 0xce, 0x3d, 0x03, 0x01, 0x07,
        ]);
        der
    }

    fn scalar_one() -> [u8; 32] {
        let mut scalar = [0u8; 32];
        scalar[31] = 1;
        scalar
    }

    #[test]
    fn test_scalar_one_yields_generator() {
        let kex = P256KeyExchange::new(&der_for_scalar(scalar_one())).unwrap();
        let public = kex.public_value();

        assert_eq!(public.len(), UNCOMPRESSED_P256_POINT_BYTES);
        assert_eq!(public[0], 0x04);
        assert_eq!(&public[1..33], &GENERATOR_X);
        assert_eq!(&public[33..], &GENERATOR_Y);
    }

    #[test]
    fn test_scalar_one_shared_key_is_peer_x() {
        let one = P256KeyExchange::new(&der_for_scalar(scalar_one())).unwrap();
        let peer = P256KeyExchange::generate().unwrap();

        let shared = one.calculate_shared_key(peer.public_value()).unwrap();
        assert_eq!(shared.as_slice(), &peer.public_value()[1..33]);
    }

    #[test]
    fn test_zero_scalar_rejected() {
        let result = P256KeyExchange::new(&der_for_scalar([0u8; 32]));
        assert!(matches!(result, Err(ProtocolError::InvalidPrivateKey(_))));
    }

    #[test]
    fn test_mismatched_embedded_public_key_rejected() {
        let mut der = P256KeyExchange::new_private_key().unwrap().to_vec();
        let last = der.len() - 1;
        der[last] ^= 0x01;

        assert!(P256KeyExchange::new(&der).is_err());
    }

    #[test]
    fn test_compressed_length_rejected() {
        let kex = P256KeyExchange::generate().unwrap();
        let result = kex.calculate_shared_key(&[0x02; 33]);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidPublicValueLength {
                expected: 65,
                actual: 33
            })
        ));
    }

    #[test]
    fn test_wrong_tag_rejected() {
        let kex = P256KeyExchange::generate().unwrap();
        let mut peer = kex.public_value().to_vec();
        peer[0] = 0x06;

        assert!(matches!(
            kex.calculate_shared_key(&peer),
            Err(ProtocolError::InvalidPublicPoint)
        ));
    }

    #[test]
    fn test_factory_creates_distinct_keys() {
        let kex = P256KeyExchange::generate().unwrap();
        let factory = kex.factory();
        assert_eq!(factory.tag(), P256_TAG);
        assert_eq!(kex.tag(), P256_TAG);

        let a = factory.create().unwrap();
        let b = factory.create().unwrap();
        assert_ne!(a.public_value(), b.public_value());
        assert_eq!(
            a.calculate_shared_key(b.public_value()).unwrap(),
            b.calculate_shared_key(a.public_value()).unwrap()
        );
    }

    #[test]
    fn test_debug_hides_private_key() {
        let kex = P256KeyExchange::new(&der_for_scalar(scalar_one())).unwrap();
        let rendered = format!("{kex:?}");
        assert!(rendered.contains("public_key"));
        assert!(!rendered.contains("private_key"));
    }
}
