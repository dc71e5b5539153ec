//! # Error Types
//!
//! Error handling for the datagram reader and the key-exchange primitives.
//!
//! ## Error Categories
//! - **I/O Errors**: socket receive failures and closed connections
//! - **Key Material Errors**: empty, undecodable or off-curve private keys
//! - **Peer Value Errors**: wrong-length or off-curve peer public values
//! - **Configuration Errors**: invalid reader or logging settings
//!
//! None of these are raised as panics. The reader hands I/O errors to its
//! visitor exactly once; key-exchange failures are returned to the caller so
//! the handshake can be aborted without tearing down the process.
//!
//! ## Example Usage
//! ```rust
//! use quicwire::crypto::p256::P256KeyExchange;
//! use quicwire::error::ProtocolError;
//!
//! match P256KeyExchange::new(b"") {
//!     Err(ProtocolError::InvalidPrivateKey(reason)) => assert!(reason.contains("empty")),
//!     other => panic!("unexpected result: {:?}", other.map(|_| ())),
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Private key errors
    pub const ERR_PRIVATE_KEY_EMPTY: &str = "Private key is empty";
    pub const ERR_PRIVATE_KEY_INVALID: &str = "Private key is invalid";
    pub const ERR_PUBLIC_KEY_UNAVAILABLE: &str = "Can't get public key";

    /// Key generation errors
    pub const ERR_KEY_SERIALIZATION: &str = "Can't convert private key to DER";

    /// Peer value errors
    pub const ERR_PEER_POINT_INVALID: &str = "Can't convert peer public value to curve point";
    pub const ERR_SHARED_KEY_FAILED: &str = "Can't compute ECDH shared key";
}

// ProtocolError is the primary error type for all crate operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Key generation failed: {0}")]
    KeyGenerationFailure(String),

    #[error("Invalid peer public value length: expected {expected} bytes, got {actual}")]
    InvalidPublicValueLength { expected: usize, actual: usize },

    #[error("Peer public value is not a valid curve point")]
    InvalidPublicPoint,

    #[error("Shared key computation failed")]
    SharedKeyFailure,

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
