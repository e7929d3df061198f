//! Persisted record layout
//!
//! 16 bytes, little-endian, fixed offsets so records written by older
//! firmware stay readable:
//!
//! ```text
//! 0..4    current position (i32)
//! 4..8    target position (i32)
//! 8       direction flag (0 = toward minimum, 1 = toward maximum)
//! 9..12   reserved, zero
//! 12..16  magic (u32)
//! ```

use crate::config::SoftLimits;

use super::store::RestoreOutcome;

/// Validity marker stored with every record
pub const RECORD_MAGIC: u32 = 0x1234_5678;

/// Encoded record size in bytes
pub const RECORD_LEN: usize = 16;

const MAGIC_OFFSET: usize = 12;

/// Durable snapshot of the axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PersistedRecord {
    /// Position in steps when the record was taken
    pub position_steps: i32,
    /// Target in steps when the record was taken
    pub target_steps: i32,
    /// Next automatic move heads toward the upper soft limit
    pub going_forward: bool,
}

impl PersistedRecord {
    /// Safe default: at the zero reference, target the lower soft limit,
    /// next oscillation toward the minimum
    pub fn fresh(limits: SoftLimits) -> Self {
        Self {
            position_steps: 0,
            target_steps: limits.min_steps,
            going_forward: false,
        }
    }

    /// Serialize to the fixed on-flash layout
    pub fn encode(&self) -> [u8; RECORD_LEN] {
        let mut bytes = [0u8; RECORD_LEN];
        bytes[0..4].copy_from_slice(&self.position_steps.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.target_steps.to_le_bytes());
        bytes[8] = self.going_forward as u8;
        bytes[MAGIC_OFFSET..].copy_from_slice(&RECORD_MAGIC.to_le_bytes());
        bytes
    }

    /// Parse the fixed on-flash layout
    ///
    /// Fails with [`RestoreOutcome::Corrupt`] on a wrong length or a
    /// direction byte other than 0 or 1, and with
    /// [`RestoreOutcome::BadMagic`] when the marker does not match.
    /// Reserved bytes are ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self, RestoreOutcome> {
        let bytes: &[u8; RECORD_LEN] = bytes.try_into().map_err(|_| RestoreOutcome::Corrupt)?;

        let magic = u32::from_le_bytes(word(bytes, MAGIC_OFFSET));
        if magic != RECORD_MAGIC {
            return Err(RestoreOutcome::BadMagic);
        }

        let going_forward = match bytes[8] {
            0 => false,
            1 => true,
            _ => return Err(RestoreOutcome::Corrupt),
        };

        Ok(Self {
            position_steps: i32::from_le_bytes(word(bytes, 0)),
            target_steps: i32::from_le_bytes(word(bytes, 4)),
            going_forward,
        })
    }
}

fn word(bytes: &[u8; RECORD_LEN], offset: usize) -> [u8; 4] {
    [
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let record = PersistedRecord {
            position_steps: -2,
            target_steps: 0x0102_0304,
            going_forward: true,
        };
        let bytes = record.encode();
        assert_eq!(
            bytes,
            [
                0xFE, 0xFF, 0xFF, 0xFF, // position
                0x04, 0x03, 0x02, 0x01, // target
                0x01, 0x00, 0x00, 0x00, // direction + reserved
                0x78, 0x56, 0x34, 0x12, // magic
            ]
        );
        assert_eq!(PersistedRecord::decode(&bytes), Ok(record));
    }

    #[test]
    fn test_fresh_record() {
        let limits = SoftLimits {
            min_steps: -40_000,
            max_steps: 40_000,
        };
        let record = PersistedRecord::fresh(limits);
        assert_eq!(record.position_steps, 0);
        assert_eq!(record.target_steps, -40_000);
        assert!(!record.going_forward);
    }

    #[test]
    fn test_decode_rejects_bad_magic() {
        let mut bytes = PersistedRecord::fresh(SoftLimits {
            min_steps: 0,
            max_steps: 0,
        })
        .encode();
        bytes[15] ^= 0x80;
        assert_eq!(PersistedRecord::decode(&bytes), Err(RestoreOutcome::BadMagic));

        // Erased flash
        assert_eq!(
            PersistedRecord::decode(&[0xFF; RECORD_LEN]),
            Err(RestoreOutcome::BadMagic)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let bytes = PersistedRecord {
            position_steps: 1,
            target_steps: 2,
            going_forward: false,
        }
        .encode();
        assert_eq!(
            PersistedRecord::decode(&bytes[..12]),
            Err(RestoreOutcome::Corrupt)
        );
        assert_eq!(PersistedRecord::decode(&[]), Err(RestoreOutcome::Corrupt));
    }

    #[test]
    fn test_decode_rejects_bad_direction_byte() {
        let mut bytes = PersistedRecord {
            position_steps: 1,
            target_steps: 2,
            going_forward: false,
        }
        .encode();
        bytes[8] = 7;
        assert_eq!(PersistedRecord::decode(&bytes), Err(RestoreOutcome::Corrupt));
    }

    #[test]
    fn test_decode_ignores_reserved_bytes() {
        let record = PersistedRecord {
            position_steps: 123,
            target_steps: -456,
            going_forward: false,
        };
        let mut bytes = record.encode();
        bytes[9..12].copy_from_slice(&[0xAA, 0xBB, 0xCC]);
        assert_eq!(PersistedRecord::decode(&bytes), Ok(record));
    }
}
