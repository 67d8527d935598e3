// bitcoin-crypto/src/curve.rs

//! secp256k1 domain parameters shared by every key pair.
//!
//! The curve context is built once per process and only ever read afterwards,
//! so signing and verification can run from any number of threads.

use secp256k1::constants;
use secp256k1::{All, Secp256k1};
use std::sync::OnceLock;

/// Order `n` of the generator point, big-endian
pub const CURVE_ORDER: [u8; 32] = constants::CURVE_ORDER;

/// X coordinate of the generator point `G`, big-endian
pub const GENERATOR_X: [u8; 32] = constants::GENERATOR_X;

/// Y coordinate of the generator point `G`, big-endian
pub const GENERATOR_Y: [u8; 32] = constants::GENERATOR_Y;

/// Cofactor `h` of secp256k1
pub const COFACTOR: u8 = 1;

/// Size of a private scalar in bytes
pub const SECRET_KEY_SIZE: usize = constants::SECRET_KEY_SIZE;

/// Size of a compressed SEC1 public key
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = constants::PUBLIC_KEY_SIZE;

/// Size of an uncompressed SEC1 public key
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = constants::UNCOMPRESSED_PUBLIC_KEY_SIZE;

static CONTEXT: OnceLock<Secp256k1<All>> = OnceLock::new();

/// Process-wide signing and verification context
pub fn context() -> &'static Secp256k1<All> {
    CONTEXT.get_or_init(|| {
        tracing::debug!("Initialising secp256k1 context");
        Secp256k1::new()
    })
}

/// Compare a 32-byte big-endian scalar against the curve order
pub fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    scalar.iter().any(|b| *b != 0) && scalar[..] < CURVE_ORDER[..]
}
