//! Compact persisted form of a [`Unit`].
//!
//! ## Format
//! - 4 bytes magic (`HSTB`)
//! - `u16` schema version, little-endian
//! - `u16` reserved (zero)
//! - a bincode payload with fixed-width little-endian integers
//!
//! Whatever the stub writer emits must decode to an identical `Unit`.

use bincode::Options;

use crate::error::StubError;
use crate::unit::Unit;

pub const UNIT_MAGIC: [u8; 4] = *b"HSTB";
pub const UNIT_SCHEMA_VERSION: u16 = 1;
pub const HEADER_LEN: usize = 8;

/// Hard upper bound for a single unit payload.
///
/// Corrupted length prefixes should degrade to a decode error, not an
/// out-of-memory crash.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

fn bincode_options() -> impl bincode::Options + Copy {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

/// Encoder/decoder for persisted units.
#[derive(Clone, Copy, Debug)]
pub struct UnitCodec {
    max_payload_bytes: usize,
}

impl Default for UnitCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD_BYTES)
    }
}

impl UnitCodec {
    pub fn new(max_payload_bytes: usize) -> Self {
        Self { max_payload_bytes }
    }

    pub fn max_payload_bytes(&self) -> usize {
        self.max_payload_bytes
    }

    pub fn encode(&self, unit: &Unit) -> Result<Vec<u8>, StubError> {
        let payload_len = bincode_options().serialized_size(unit)? as usize;
        let mut out = Vec::with_capacity(HEADER_LEN + payload_len);
        out.extend_from_slice(&UNIT_MAGIC);
        out.extend_from_slice(&UNIT_SCHEMA_VERSION.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        bincode_options().serialize_into(&mut out, unit)?;
        Ok(out)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<Unit, StubError> {
        if bytes.len() < HEADER_LEN {
            return Err(StubError::Truncated {
                expected: HEADER_LEN,
                found: bytes.len(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        if magic != UNIT_MAGIC {
            return Err(StubError::BadMagic { found: magic });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != UNIT_SCHEMA_VERSION {
            return Err(StubError::IncompatibleSchemaVersion {
                expected: UNIT_SCHEMA_VERSION,
                found: version,
            });
        }

        let unit = bincode_options()
            .with_limit(self.max_payload_bytes as u64)
            .reject_trailing_bytes()
            .deserialize(&bytes[HEADER_LEN..])?;
        Ok(unit)
    }
}

/// Encode with the default codec.
pub fn encode_unit(unit: &Unit) -> Result<Vec<u8>, StubError> {
    UnitCodec::default().encode(unit)
}

/// Decode with the default codec.
pub fn decode_unit(bytes: &[u8]) -> Result<Unit, StubError> {
    UnitCodec::default().decode(bytes)
}
