// bitcoin-crypto/src/hash.rs

use crate::{CryptoError, CryptoResult};
use hmac::digest::generic_array::GenericArray;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use ripemd::Ripemd160;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// SHA-256 output size in bytes
pub const HASH_SIZE: usize = 32;

/// RIPEMD-160 output size in bytes
pub const HASH160_SIZE: usize = 20;

/// SHA-512 output size in bytes
pub const HASH512_SIZE: usize = 64;

/// Supported 32-byte hash algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Sha256,
    /// SHA-256 applied twice, the Bitcoin integrity digest
    DoubleSha256,
}

/// A 32-byte hash value
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    /// Create a new hash from bytes
    pub fn new(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a hash from a slice (returns error if wrong length)
    pub fn from_slice(slice: &[u8]) -> CryptoResult<Self> {
        if slice.len() != HASH_SIZE {
            return Err(CryptoError::InvalidHash);
        }
        let mut bytes = [0u8; HASH_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Get the hash as a byte slice
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the hash as a fixed-size array
    pub fn to_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    pub fn zero() -> Self {
        Self([0u8; HASH_SIZE])
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::DeserializationError(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hash({}...{})",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[28..])
        )
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Default for Hash {
    fn default() -> Self {
        Self::zero()
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A 20-byte RIPEMD-160(SHA-256(x)) value, the public key hash behind addresses
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
pub struct Hash160([u8; HASH160_SIZE]);

impl Hash160 {
    pub fn new(bytes: [u8; HASH160_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; HASH160_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::DeserializationError(e.to_string()))?;
        if bytes.len() != HASH160_SIZE {
            return Err(CryptoError::InvalidHash);
        }
        let mut arr = [0u8; HASH160_SIZE];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Hash160 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash160({})", self.to_hex())
    }
}

/// A 64-byte SHA-512 or HMAC-SHA512 value
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Hash512([u8; HASH512_SIZE]);

impl Hash512 {
    pub fn new(bytes: [u8; HASH512_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; HASH512_SIZE] {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Hash512 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hash512({}...{})",
            hex::encode(&self.0[..4]),
            hex::encode(&self.0[60..])
        )
    }
}

/// Trait for types that can be hashed
pub trait Hashable {
    /// Bitcoin's default digest, double SHA-256
    fn hash(&self) -> Hash;
    fn hash_with(&self, algorithm: HashAlgorithm) -> Hash;
}

impl Hashable for [u8] {
    fn hash(&self) -> Hash {
        self.hash_with(HashAlgorithm::DoubleSha256)
    }

    fn hash_with(&self, algorithm: HashAlgorithm) -> Hash {
        match algorithm {
            HashAlgorithm::Sha256 => sha256(self),
            HashAlgorithm::DoubleSha256 => double_sha256(self),
        }
    }
}

impl Hashable for Vec<u8> {
    fn hash(&self) -> Hash {
        self.as_slice().hash()
    }

    fn hash_with(&self, algorithm: HashAlgorithm) -> Hash {
        self.as_slice().hash_with(algorithm)
    }
}

impl Hashable for &str {
    fn hash(&self) -> Hash {
        self.as_bytes().hash()
    }

    fn hash_with(&self, algorithm: HashAlgorithm) -> Hash {
        self.as_bytes().hash_with(algorithm)
    }
}

/// SHA-256 of `data`
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Hash::new(hasher.finalize().into())
}

/// SHA-512 of `data`
pub fn sha512(data: &[u8]) -> Hash512 {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut output = [0u8; HASH512_SIZE];
    output.copy_from_slice(&hasher.finalize());
    Hash512::new(output)
}

/// SHA-256(SHA-256(data)), used for transaction ids, block hashes and checksums
pub fn double_sha256(data: &[u8]) -> Hash {
    let first = sha256(data);
    sha256(first.as_bytes())
}

/// RIPEMD-160(SHA-256(data)), used to derive a public key hash
pub fn hash160(data: &[u8]) -> Hash160 {
    let first = sha256(data);
    let mut hasher = Ripemd160::new();
    hasher.update(first.as_bytes());
    Hash160::new(hasher.finalize().into())
}

/// SHA-512 input block size, which is also the HMAC key width
const SHA512_BLOCK_SIZE: usize = 128;

/// HMAC-SHA512 of `data` under `key`. Any key length is accepted.
pub fn hmac_sha512(data: &[u8], key: &[u8]) -> Hash512 {
    // Keys wider than a block are hashed first, shorter ones are zero-padded
    let mut block = [0u8; SHA512_BLOCK_SIZE];
    if key.len() > SHA512_BLOCK_SIZE {
        block[..HASH512_SIZE].copy_from_slice(sha512(key).as_bytes());
    } else {
        block[..key.len()].copy_from_slice(key);
    }

    let mut mac = <Hmac<Sha512> as KeyInit>::new(GenericArray::from_slice(&block));
    mac.update(data);
    let mut output = [0u8; HASH512_SIZE];
    output.copy_from_slice(&mac.finalize().into_bytes());
    Hash512::new(output)
}

/// Borrow `length` bytes of `input` starting at `offset`
pub fn byte_range(input: &[u8], offset: usize, length: usize) -> CryptoResult<&[u8]> {
    let end = offset
        .checked_add(length)
        .filter(|end| *end <= input.len())
        .ok_or(CryptoError::InvalidRange {
            offset,
            length,
            available: input.len(),
        })?;
    Ok(&input[offset..end])
}

pub fn sha256_range(input: &[u8], offset: usize, length: usize) -> CryptoResult<Hash> {
    Ok(sha256(byte_range(input, offset, length)?))
}

pub fn sha512_range(input: &[u8], offset: usize, length: usize) -> CryptoResult<Hash512> {
    Ok(sha512(byte_range(input, offset, length)?))
}

pub fn double_sha256_range(input: &[u8], offset: usize, length: usize) -> CryptoResult<Hash> {
    Ok(double_sha256(byte_range(input, offset, length)?))
}

pub fn hash160_range(input: &[u8], offset: usize, length: usize) -> CryptoResult<Hash160> {
    Ok(hash160(byte_range(input, offset, length)?))
}

pub fn hmac_sha512_range(
    input: &[u8],
    offset: usize,
    length: usize,
    key: &[u8],
) -> CryptoResult<Hash512> {
    Ok(hmac_sha512(byte_range(input, offset, length)?, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_basic() {
        let data = b"Hello, World!";
        let hash1 = data.hash();
        let hash2 = data.hash();
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_algorithms() {
        let data = b"test data";
        let single = data.hash_with(HashAlgorithm::Sha256);
        let double = data.hash_with(HashAlgorithm::DoubleSha256);
        assert_ne!(single, double);
        assert_eq!(double, data.hash());
    }

    #[test]
    fn test_hash_hex() {
        let data = b"test";
        let hash = data.hash();
        let hex = hash.to_hex();
        let parsed = Hash::from_hex(&hex).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_sha256_known_answers() {
        assert_eq!(
            sha256(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256(b"this is the data I want to hash").to_hex(),
            "f88eec7ecabf88f9a64c4100cac1e0c0c4581100492137d1b656ea626cad63e3"
        );
    }

    #[test]
    fn test_double_sha256_known_answers() {
        assert_eq!(
            double_sha256(b"").to_hex(),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
        assert_eq!(
            double_sha256(b"this is the data I want to hash").to_hex(),
            "2209ddda5914a3fbad507ff2284c4b6e559c18a669f9fc3ad3b5826a2a999d58"
        );
    }

    #[test]
    fn test_double_sha256_is_sha256_twice() {
        let inputs: [&[u8]; 4] = [b"", b"a", b"double hash test", &[0xffu8; 200]];
        for data in inputs {
            assert_eq!(double_sha256(data), sha256(sha256(data).as_bytes()));
        }
    }

    #[test]
    fn test_hash160_known_answers() {
        assert_eq!(
            hash160(b"").to_hex(),
            "b472a266d0bd89c13706a4132ccfb16f7c3b9fcb"
        );
        assert_eq!(
            hash160(b"this is the data I want to hash").to_hex(),
            "e7fb13ef86fef4203f042fbfc2703fa628301e90"
        );
    }

    #[test]
    fn test_sha512_known_answer() {
        assert_eq!(
            sha512(b"").to_hex(),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
             47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn test_hmac_sha512_rfc4231() {
        // RFC 4231 test case 1 and 2
        let key = [0x0bu8; 20];
        let mac = hmac_sha512(b"Hi There", &key);
        assert_eq!(
            mac.to_hex(),
            "87aa7cdea5ef619d4ff0b4241a1d6cb02379f4e2ce4ec2787ad0b30545e17cde\
             daa833b7d6b8a702038b274eaea3f4e4be9d914eeb61f1702e696c203a126854"
        );

        let mac = hmac_sha512(b"what do ya want for nothing?", b"Jefe");
        assert_eq!(
            mac.to_hex(),
            "164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea250554\
             9758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
        );
    }

    #[test]
    fn test_hmac_sha512_any_key_length() {
        let data = b"compact size keys and oversized keys";
        for len in [0usize, 1, 20, 64, 127, 128, 129, 131, 300] {
            let key: Vec<u8> = (0..len).map(|i| i as u8).collect();
            let mut reference = <Hmac<Sha512> as Mac>::new_from_slice(&key).unwrap();
            reference.update(data);
            assert_eq!(
                hmac_sha512(data, &key).as_bytes(),
                reference.finalize().into_bytes().as_slice(),
                "key length {}",
                len
            );
        }
    }

    #[test]
    fn test_range_variants_hash_the_window() {
        let buffer = b"xxthis is the data I want to hashyy";
        let inner = &buffer[2..buffer.len() - 2];

        assert_eq!(sha256_range(buffer, 2, inner.len()).unwrap(), sha256(inner));
        assert_eq!(
            double_sha256_range(buffer, 2, inner.len()).unwrap(),
            double_sha256(inner)
        );
        assert_eq!(hash160_range(buffer, 2, inner.len()).unwrap(), hash160(inner));
        assert_eq!(sha512_range(buffer, 2, inner.len()).unwrap(), sha512(inner));
        assert_eq!(
            hmac_sha512_range(buffer, 2, inner.len(), b"key").unwrap(),
            hmac_sha512(inner, b"key")
        );
    }

    #[test]
    fn test_range_out_of_bounds() {
        let buffer = [0u8; 8];
        assert!(matches!(
            sha256_range(&buffer, 4, 5),
            Err(CryptoError::InvalidRange { offset: 4, length: 5, available: 8 })
        ));
        assert!(sha256_range(&buffer, usize::MAX, 2).is_err());
        assert!(sha256_range(&buffer, 8, 0).is_ok());
    }
}
