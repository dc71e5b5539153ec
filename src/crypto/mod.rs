//! # Handshake Cryptography
//!
//! Key-exchange primitives used by the session layer during a handshake.
//! Independent of the packet I/O path.
//!
//! ## Components
//! - **Key Exchange**: algorithm-neutral trait, factory and wire tags
//! - **P-256**: ECDH over NIST P-256 with strict SEC1 validation
//!
//! ## Security
//! - Curve arithmetic delegated to RustCrypto `p256`
//! - Peer points are checked for length, encoding tag and curve membership
//! - Private scalars and shared secrets are zeroized on drop

pub mod key_exchange;
pub mod p256;

pub use self::key_exchange::{KeyExchange, KeyExchangeFactory, QuicTag, P256_TAG};
pub use self::p256::{P256KeyExchange, P256KeyExchangeFactory};
