// bitcoin-crypto/src/signature.rs

//! ASN.1 DER codec for ECDSA signatures.
//!
//! Only the shape Bitcoin uses is understood:
//!
//! ```text
//! 0x30 <len> 0x02 <r_len> <r> 0x02 <s_len> <s>
//! ```
//!
//! Integers are stored as big-endian magnitudes with redundant leading zero
//! bytes removed. Decoding is strict: negative integers, padded integers and
//! non-minimal lengths are rejected, so every accepted input re-encodes to
//! itself. Whether `r` and `s` are in range for the curve is a question for
//! verification, not for the codec.

use crate::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};
use std::fmt;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

/// A DER-encoded `SEQUENCE { INTEGER r, INTEGER s }`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DerSignature {
    r: Vec<u8>,
    s: Vec<u8>,
}

impl DerSignature {
    /// Build a signature from big-endian `r` and `s` scalars
    pub fn from_scalars(r: &[u8], s: &[u8]) -> Self {
        Self {
            r: strip_leading_zeros(r).to_vec(),
            s: strip_leading_zeros(s).to_vec(),
        }
    }

    /// Minimal big-endian magnitude of `r`
    pub fn r(&self) -> &[u8] {
        &self.r
    }

    /// Minimal big-endian magnitude of `s`
    pub fn s(&self) -> &[u8] {
        &self.s
    }

    /// 64-byte `r || s` form, or `None` when either integer does not fit a
    /// 32-byte scalar
    pub fn to_compact(&self) -> Option<[u8; 64]> {
        if self.r.len() > 32 || self.s.len() > 32 {
            return None;
        }
        let mut out = [0u8; 64];
        out[32 - self.r.len()..32].copy_from_slice(&self.r);
        out[64 - self.s.len()..].copy_from_slice(&self.s);
        Some(out)
    }

    /// Encode as DER with minimal-length integers
    pub fn to_der(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(72);
        encode_integer(&mut body, &self.r);
        encode_integer(&mut body, &self.s);

        let mut out = Vec::with_capacity(body.len() + 3);
        out.push(SEQUENCE_TAG);
        encode_length(&mut out, body.len());
        out.extend_from_slice(&body);
        out
    }

    /// Decode a DER signature. Trailing data, a wrong tag, anything other
    /// than exactly two integers, or an integer that is negative or padded is
    /// rejected.
    pub fn from_der(bytes: &[u8]) -> CryptoResult<Self> {
        let mut outer = DerReader::new(bytes);
        let body = outer.read_element(SEQUENCE_TAG, "sequence")?;
        if !outer.is_empty() {
            return Err(malformed("trailing bytes after sequence"));
        }

        let mut inner = DerReader::new(body);
        let r = inner.read_element(INTEGER_TAG, "r integer")?;
        let s = inner.read_element(INTEGER_TAG, "s integer")?;
        if !inner.is_empty() {
            return Err(malformed("sequence holds more than two elements"));
        }

        check_integer(r, "r integer")?;
        check_integer(s, "s integer")?;
        Ok(Self {
            r: strip_leading_zeros(r).to_vec(),
            s: strip_leading_zeros(s).to_vec(),
        })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.to_der())
    }

    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes =
            hex::decode(s).map_err(|e| CryptoError::DeserializationError(e.to_string()))?;
        Self::from_der(&bytes)
    }
}

impl TryFrom<Vec<u8>> for DerSignature {
    type Error = CryptoError;

    fn try_from(bytes: Vec<u8>) -> CryptoResult<Self> {
        Self::from_der(&bytes)
    }
}

impl From<DerSignature> for Vec<u8> {
    fn from(sig: DerSignature) -> Self {
        sig.to_der()
    }
}

impl fmt::Debug for DerSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerSignature({})", self.to_hex())
    }
}

fn malformed(reason: &str) -> CryptoError {
    CryptoError::InvalidSignature(reason.to_string())
}

/// Non-negative and minimally encoded: a leading 0x00 only in front of a set
/// high bit
fn check_integer(content: &[u8], what: &str) -> CryptoResult<()> {
    match content {
        [first, ..] if first & 0x80 != 0 => Err(malformed(&format!("negative {}", what))),
        [0x00, next, ..] if next & 0x80 == 0 => {
            Err(malformed(&format!("non-minimal padding in {}", what)))
        }
        _ => Ok(()),
    }
}

fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[start..]
}

fn encode_integer(out: &mut Vec<u8>, magnitude: &[u8]) {
    let magnitude = strip_leading_zeros(magnitude);
    // Zero still needs one content byte; a set high bit needs a 0x00 pad
    let pad = magnitude.first().map_or(true, |b| b & 0x80 != 0);
    out.push(INTEGER_TAG);
    encode_length(out, magnitude.len() + usize::from(pad));
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(magnitude);
}

fn encode_length(out: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        out.push(len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let significant = strip_leading_zeros(&bytes);
        out.push(0x80 | significant.len() as u8);
        out.extend_from_slice(significant);
    }
}

/// Cursor over DER tag-length-value elements
struct DerReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DerReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn read_byte(&mut self, what: &str) -> CryptoResult<u8> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or_else(|| malformed(&format!("unexpected end of data reading {}", what)))?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_length(&mut self, what: &str) -> CryptoResult<usize> {
        let first = self.read_byte(what)?;
        if first < 0x80 {
            return Ok(first as usize);
        }

        let count = (first & 0x7f) as usize;
        if count == 0 || count > std::mem::size_of::<usize>() {
            return Err(malformed(&format!("unsupported length form for {}", what)));
        }
        let mut len = 0usize;
        for i in 0..count {
            let byte = self.read_byte(what)?;
            if i == 0 && byte == 0 {
                return Err(malformed(&format!("non-minimal length for {}", what)));
            }
            len = (len << 8) | byte as usize;
        }
        if len < 0x80 {
            return Err(malformed(&format!("non-minimal length for {}", what)));
        }
        Ok(len)
    }

    fn read_element(&mut self, tag: u8, what: &str) -> CryptoResult<&'a [u8]> {
        let found = self.read_byte(what)?;
        if found != tag {
            return Err(malformed(&format!(
                "expected tag 0x{:02x} for {}, found 0x{:02x}",
                tag, what, found
            )));
        }
        let len = self.read_length(what)?;
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| malformed(&format!("{} length exceeds available data", what)))?;
        if tag == INTEGER_TAG && len == 0 {
            return Err(malformed(&format!("empty {}", what)));
        }
        let content = &self.data[self.pos..end];
        self.pos = end;
        Ok(content)
    }
}
