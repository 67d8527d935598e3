// bitcoin-crypto/src/keypair.rs

use crate::config::KeyConfig;
use crate::curve::{self, SECRET_KEY_SIZE};
use crate::hash::{self, Hash160, HASH_SIZE};
use crate::signature::DerSignature;
use crate::{CryptoError, CryptoResult};
use rand::rngs::OsRng;
use rand_core::{CryptoRng, RngCore};
use secp256k1::ecdsa::Signature as Secp256k1Sig;
use secp256k1::{Message, PublicKey as Secp256k1Pk, SecretKey as Secp256k1Sk};
use serde::{Deserialize, Serialize};
use std::fmt;

/// SEC1-encoded secp256k1 public key, compressed (33 bytes) or uncompressed (65 bytes)
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct PublicKey {
    bytes: Vec<u8>,
}

impl PublicKey {
    /// Parse SEC1 bytes. The format is detected from the prefix byte and length.
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        parse_point(bytes)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    fn from_point(point: &Secp256k1Pk, compressed: bool) -> Self {
        let bytes = if compressed {
            point.serialize().to_vec()
        } else {
            point.serialize_uncompressed().to_vec()
        };
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn is_compressed(&self) -> bool {
        self.bytes.len() == curve::COMPRESSED_PUBLIC_KEY_SIZE
    }

    /// Same point in 33-byte form
    pub fn to_compressed(&self) -> CryptoResult<Self> {
        Ok(Self::from_point(&parse_point(&self.bytes)?, true))
    }

    /// Same point in 65-byte form
    pub fn to_uncompressed(&self) -> CryptoResult<Self> {
        Ok(Self::from_point(&parse_point(&self.bytes)?, false))
    }

    /// RIPEMD-160(SHA-256(key)), the payload of a pay-to-pubkey-hash address
    pub fn hash160(&self) -> Hash160 {
        hash::hash160(&self.bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::DeserializationError(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Verify a DER signature over a 32-byte digest
    pub fn verify(&self, digest: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        EcKeyPair::verify_with_public_key(digest, signature, &self.bytes)
    }
}

impl TryFrom<Vec<u8>> for PublicKey {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> CryptoResult<Self> {
        parse_point(&bytes)?;
        Ok(Self { bytes })
    }
}

impl From<PublicKey> for Vec<u8> {
    fn from(key: PublicKey) -> Self {
        key.bytes
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

/// 32-byte big-endian private scalar, zeroed on drop
pub struct SecretKey {
    bytes: [u8; SECRET_KEY_SIZE],
}

impl SecretKey {
    /// Interpret `bytes` as a big-endian unsigned integer. Leading zero bytes
    /// are ignored; the value must satisfy `0 < d < n`.
    pub fn from_be_bytes(bytes: &[u8]) -> CryptoResult<Self> {
        let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
        let significant = &bytes[start..];
        if significant.len() > SECRET_KEY_SIZE {
            return Err(CryptoError::InvalidSecretKey(format!(
                "scalar needs {} bytes, at most {} allowed",
                significant.len(),
                SECRET_KEY_SIZE
            )));
        }

        let mut padded = [0u8; SECRET_KEY_SIZE];
        padded[SECRET_KEY_SIZE - significant.len()..].copy_from_slice(significant);
        if !curve::is_valid_scalar(&padded) {
            padded.iter_mut().for_each(|b| *b = 0);
            return Err(CryptoError::InvalidSecretKey(
                "scalar must be non-zero and below the curve order".into(),
            ));
        }
        Ok(Self { bytes: padded })
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_KEY_SIZE] {
        &self.bytes
    }

    fn to_secp(&self) -> CryptoResult<Secp256k1Sk> {
        Secp256k1Sk::from_slice(&self.bytes)
            .map_err(|e| CryptoError::InvalidSecretKey(e.to_string()))
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        // Zero out the key material on drop
        self.bytes.iter_mut().for_each(|b| *b = 0);
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey([REDACTED])")
    }
}

/// An elliptic curve key pair we own and can sign transactions with.
///
/// The public key is always the encoding of `G * d` in the compression mode
/// chosen at construction. Nothing changes after that.
pub struct EcKeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
    compressed: bool,
}

impl EcKeyPair {
    /// Generate a new random keypair with a compressed public key
    pub fn generate() -> CryptoResult<Self> {
        Self::generate_with_rng(&mut OsRng, true)
    }

    pub fn generate_with_config(config: &KeyConfig) -> CryptoResult<Self> {
        Self::generate_with_rng(&mut OsRng, config.compressed_public_keys)
    }

    /// Draw a scalar uniformly from `[1, n-1]` by rejection sampling
    pub fn generate_with_rng<R: RngCore + CryptoRng>(
        rng: &mut R,
        compressed: bool,
    ) -> CryptoResult<Self> {
        let mut candidate = [0u8; SECRET_KEY_SIZE];
        let secret_key = loop {
            rng.try_fill_bytes(&mut candidate)
                .map_err(|e| CryptoError::RngError(e.to_string()))?;
            if curve::is_valid_scalar(&candidate) {
                break SecretKey::from_be_bytes(&candidate)?;
            }
        };
        candidate.iter_mut().for_each(|b| *b = 0);

        let keypair = Self::from_secret_key(secret_key, compressed)?;
        tracing::debug!("Generated keypair {}", keypair.public_key.to_hex());
        Ok(keypair)
    }

    /// Import a private key given as big-endian bytes. Public keys are
    /// derivable from private keys by multiplying with the generator.
    pub fn from_private_key(bytes: &[u8], compressed: bool) -> CryptoResult<Self> {
        let secret_key = SecretKey::from_be_bytes(bytes)?;
        let keypair = Self::from_secret_key(secret_key, compressed)?;
        tracing::debug!("Imported keypair {}", keypair.public_key.to_hex());
        Ok(keypair)
    }

    fn from_secret_key(secret_key: SecretKey, compressed: bool) -> CryptoResult<Self> {
        let point = Secp256k1Pk::from_secret_key(curve::context(), &secret_key.to_secp()?);
        Ok(Self {
            public_key: PublicKey::from_point(&point, compressed),
            secret_key,
            compressed,
        })
    }

    /// Public key bytes for a private key, without keeping a keypair around
    pub fn public_key_from_private_key(bytes: &[u8], compressed: bool) -> CryptoResult<PublicKey> {
        let secret_key = SecretKey::from_be_bytes(bytes)?;
        let point = Secp256k1Pk::from_secret_key(curve::context(), &secret_key.to_secp()?);
        Ok(PublicKey::from_point(&point, compressed))
    }

    /// Raw public key as it appears in scriptSigs. This is not the address.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Exactly 32 bytes, big-endian, left-padded with zeros
    pub fn private_key_bytes(&self) -> [u8; SECRET_KEY_SIZE] {
        self.secret_key.bytes
    }

    /// ECDSA-sign a 32-byte digest and return the DER encoding
    pub fn sign(&self, digest: &[u8]) -> CryptoResult<Vec<u8>> {
        Ok(self.sign_signature(digest)?.to_der())
    }

    /// ECDSA-sign a 32-byte digest
    pub fn sign_signature(&self, digest: &[u8]) -> CryptoResult<DerSignature> {
        let msg = digest_message(digest)?;
        let sig: Secp256k1Sig = curve::context().sign_ecdsa(&msg, &self.secret_key.to_secp()?);
        let compact = sig.serialize_compact();
        Ok(DerSignature::from_scalars(&compact[..32], &compact[32..]))
    }

    /// Verify a DER signature over a 32-byte digest with this keypair's public key
    pub fn verify(&self, digest: &[u8], signature: &[u8]) -> CryptoResult<bool> {
        Self::verify_with_public_key(digest, signature, self.public_key.as_bytes())
    }

    /// Verify a DER signature over a 32-byte digest against raw public key bytes.
    ///
    /// `Ok(false)` means the signature does not match. Malformed DER or a public
    /// key that is not a curve point is an error.
    pub fn verify_with_public_key(
        digest: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> CryptoResult<bool> {
        let der = DerSignature::from_der(signature)?;
        let point = parse_point(public_key)?;
        let msg = digest_message(digest)?;

        let compact = match der.to_compact() {
            Some(compact) => compact,
            None => return Ok(false),
        };
        let mut sig = match Secp256k1Sig::from_compact(&compact) {
            Ok(sig) => sig,
            Err(_) => return Ok(false),
        };
        // Accept either half of the s range
        sig.normalize_s();

        Ok(curve::context().verify_ecdsa(&msg, &sig, &point).is_ok())
    }
}

impl fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EcKeyPair")
            .field("public_key", &self.public_key)
            .field("secret_key", &"[REDACTED]")
            .field("compressed", &self.compressed)
            .finish()
    }
}

fn parse_point(bytes: &[u8]) -> CryptoResult<Secp256k1Pk> {
    Secp256k1Pk::from_slice(bytes).map_err(|e| {
        CryptoError::InvalidPublicKey(format!("{} ({} bytes)", e, bytes.len()))
    })
}

fn digest_message(digest: &[u8]) -> CryptoResult<Message> {
    if digest.len() != HASH_SIZE {
        return Err(CryptoError::InvalidDigestLength {
            expected: HASH_SIZE,
            actual: digest.len(),
        });
    }
    Message::from_digest_slice(digest)
        .map_err(|_| CryptoError::InvalidDigestLength {
            expected: HASH_SIZE,
            actual: digest.len(),
        })
}
