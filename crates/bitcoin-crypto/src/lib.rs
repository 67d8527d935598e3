// bitcoin-crypto/src/lib.rs

//! Cryptographic primitives for a Bitcoin peer
//!
//! This crate provides:
//! - Hashing functions (SHA-256, double SHA-256, Hash160, SHA-512, HMAC-SHA512)
//! - secp256k1 key pairs with DER-encoded ECDSA signatures
//! - A hardened random byte generator with seed stretching
//! - The compact-size variable length integer codec

pub mod config;
pub mod curve;
pub mod hash;
pub mod keypair;
pub mod random;
pub mod signature;
pub mod varint;

pub use config::{CryptoConfig, KeyConfig, RandomConfig};
pub use hash::{Hash, Hash160, Hash512, HashAlgorithm, Hashable};
pub use keypair::{EcKeyPair, PublicKey, SecretKey};
pub use random::{random_bytes, SecureRandom};
pub use signature::DerSignature;
pub use varint::CompactInteger;

/// Result type for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur during cryptographic operations
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("Invalid signature encoding: {0}")]
    InvalidSignature(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid secret key: {0}")]
    InvalidSecretKey(String),

    #[error("Invalid compact integer: {0}")]
    InvalidCompactInteger(String),

    #[error("Invalid digest length: expected {expected} bytes, got {actual}")]
    InvalidDigestLength { expected: usize, actual: usize },

    #[error("Byte range out of bounds: offset {offset} + length {length} exceeds {available}")]
    InvalidRange {
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("Invalid hash")]
    InvalidHash,

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Random number generation failed: {0}")]
    RngError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}
