// bitcoin-crypto/src/varint.rs

//! Bitcoin's "compact size" variable length integer.
//!
//! | marker        | payload             | total |
//! |---------------|---------------------|-------|
//! | `0x00..=0xfc` | none, marker is value | 1   |
//! | `0xfd`        | `u16` little-endian | 3     |
//! | `0xfe`        | `u32` little-endian | 5     |
//! | `0xff`        | `u64` little-endian | 9     |

use crate::{CryptoError, CryptoResult};
use serde::{Deserialize, Serialize};

const MARKER_U16: u8 = 0xfd;
const MARKER_U32: u8 = 0xfe;
const MARKER_U64: u8 = 0xff;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompactInteger(u64);

impl CompactInteger {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Decode the integer starting at `buf[offset]`.
    ///
    /// Non-minimal encodings are accepted; only a buffer too short for the
    /// marker's payload is an error.
    pub fn decode(buf: &[u8], offset: usize) -> CryptoResult<Self> {
        let marker = *buf.get(offset).ok_or_else(|| {
            CryptoError::InvalidCompactInteger(format!(
                "offset {} is past the end of a {}-byte buffer",
                offset,
                buf.len()
            ))
        })?;

        let value = match marker {
            MARKER_U16 => u16::from_le_bytes(payload(buf, offset)?) as u64,
            MARKER_U32 => u32::from_le_bytes(payload(buf, offset)?) as u64,
            MARKER_U64 => u64::from_le_bytes(payload(buf, offset)?),
            small => small as u64,
        };
        Ok(Self(value))
    }

    /// Decode and report how many bytes the encoding occupied
    pub fn decode_with_len(buf: &[u8], offset: usize) -> CryptoResult<(Self, usize)> {
        let value = Self::decode(buf, offset)?;
        let consumed = match buf[offset] {
            MARKER_U16 => 3,
            MARKER_U32 => 5,
            MARKER_U64 => 9,
            _ => 1,
        };
        Ok((value, consumed))
    }

    /// Number of bytes the minimal encoding of this value takes
    pub fn size_in_bytes(&self) -> usize {
        match self.0 {
            0..=0xfc => 1,
            0xfd..=0xffff => 3,
            0x1_0000..=0xffff_ffff => 5,
            _ => 9,
        }
    }

    /// Minimal encoding of this value
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size_in_bytes());
        self.write_to(&mut out);
        out
    }

    /// Append the minimal encoding to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        let v = self.0;
        match self.size_in_bytes() {
            1 => out.push(v as u8),
            3 => {
                out.push(MARKER_U16);
                out.extend_from_slice(&(v as u16).to_le_bytes());
            }
            5 => {
                out.push(MARKER_U32);
                out.extend_from_slice(&(v as u32).to_le_bytes());
            }
            _ => {
                out.push(MARKER_U64);
                out.extend_from_slice(&v.to_le_bytes());
            }
        }
    }
}

/// Fixed-width little-endian payload following the marker at `offset`
fn payload<const N: usize>(buf: &[u8], offset: usize) -> CryptoResult<[u8; N]> {
    let start = offset + 1;
    let bytes = buf.get(start..start + N).ok_or_else(|| {
        CryptoError::InvalidCompactInteger(format!(
            "marker 0x{:02x} needs {} payload bytes, {} available",
            buf[offset],
            N,
            buf.len().saturating_sub(start)
        ))
    })?;
    let mut out = [0u8; N];
    out.copy_from_slice(bytes);
    Ok(out)
}

impl From<u64> for CompactInteger {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl From<usize> for CompactInteger {
    fn from(v: usize) -> Self {
        Self(v as u64)
    }
}

impl From<CompactInteger> for u64 {
    fn from(v: CompactInteger) -> Self {
        v.0
    }
}
