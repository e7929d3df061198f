//! Durable position store

use louver_hal::{FlashError, FlashStorage, StorageKey};

use crate::config::AxisConfig;

use super::record::{PersistedRecord, RECORD_LEN};

/// Read buffer size; larger than a record so oversized items are
/// detected as corrupt rather than as a buffer error
const READ_BUFFER_LEN: usize = 32;

/// Why a restored record was or was not trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RestoreOutcome {
    /// Record present and trusted
    Valid,
    /// No record stored (first boot or erased flash)
    Missing,
    /// The flash read itself failed
    ReadFailed,
    /// Wrong length or malformed fields
    Corrupt,
    /// Magic marker does not match
    BadMagic,
    /// Position outside the soft limits plus slack
    OutOfBand,
}

impl RestoreOutcome {
    /// Check if the stored record was trusted
    pub fn is_valid(self) -> bool {
        self == RestoreOutcome::Valid
    }
}

/// Axis state recovered at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RestoredState {
    /// Position in steps
    pub position_steps: i32,
    /// Target in steps at the time of the last write
    pub target_steps: i32,
    /// Next automatic move heads toward the upper soft limit
    pub going_forward: bool,
    /// The stored record was trusted; `false` means defaults were used
    pub was_valid: bool,
}

impl RestoredState {
    fn from_record(record: PersistedRecord, was_valid: bool) -> Self {
        Self {
            position_steps: record.position_steps,
            target_steps: record.target_steps,
            going_forward: record.going_forward,
            was_valid,
        }
    }
}

/// Result of [`PositionStore::load`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Restored {
    /// State to start the axis from
    pub state: RestoredState,
    /// What was found in flash
    pub outcome: RestoreOutcome,
    /// Writing the default back failed
    pub reset_error: Option<FlashError>,
}

/// Position record persistence over a [`FlashStorage`]
pub struct PositionStore<F: FlashStorage> {
    flash: F,
    config: AxisConfig,
}

impl<F: FlashStorage> PositionStore<F> {
    /// Create a store for an axis with the given configuration
    pub fn new(flash: F, config: AxisConfig) -> Self {
        Self { flash, config }
    }

    /// Underlying storage, for items other than the position record
    pub fn flash_mut(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Restore the axis state
    ///
    /// Never returns a position outside the restorable band. Any record
    /// that is missing or untrusted is replaced by the default, which is
    /// written back before returning.
    pub async fn load(&mut self) -> Restored {
        let outcome = match self.read_record().await {
            Ok(record) if self.config.is_restorable(record.position_steps) => {
                return Restored {
                    state: RestoredState::from_record(record, true),
                    outcome: RestoreOutcome::Valid,
                    reset_error: None,
                };
            }
            Ok(_) => RestoreOutcome::OutOfBand,
            Err(outcome) => outcome,
        };

        let fresh = PersistedRecord::fresh(self.config.soft_limits());
        let reset_error = self.save(&fresh).await.err();

        Restored {
            state: RestoredState::from_record(fresh, false),
            outcome,
            reset_error,
        }
    }

    /// Write a record as one item
    ///
    /// No partial-write recovery: a torn write fails the magic or range
    /// check on the next boot and falls back to defaults.
    pub async fn save(&mut self, record: &PersistedRecord) -> Result<(), FlashError> {
        self.flash
            .write(StorageKey::AxisPosition, &record.encode())
            .await
    }

    async fn read_record(&mut self) -> Result<PersistedRecord, RestoreOutcome> {
        let mut buffer = [0u8; READ_BUFFER_LEN];
        let len = match self.flash.read(StorageKey::AxisPosition, &mut buffer).await {
            Ok(len) => len,
            Err(FlashError::NotFound) => return Err(RestoreOutcome::Missing),
            Err(FlashError::BufferTooSmall) => return Err(RestoreOutcome::Corrupt),
            Err(_) => return Err(RestoreOutcome::ReadFailed),
        };
        if len != RECORD_LEN {
            return Err(RestoreOutcome::Corrupt);
        }
        PersistedRecord::decode(&buffer[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryFlash;
    use embassy_futures::block_on;

    fn store() -> PositionStore<MemoryFlash> {
        PositionStore::new(MemoryFlash::default(), AxisConfig::default())
    }

    fn default_state() -> RestoredState {
        RestoredState {
            position_steps: 0,
            target_steps: -40_000,
            going_forward: false,
            was_valid: false,
        }
    }

    fn stored_record(store: &PositionStore<MemoryFlash>) -> PersistedRecord {
        let (bytes, len) = store.flash.raw(StorageKey::AxisPosition).unwrap();
        PersistedRecord::decode(&bytes[..len]).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = store();
        let record = PersistedRecord {
            position_steps: 12_345,
            target_steps: -40_000,
            going_forward: true,
        };
        block_on(store.save(&record)).unwrap();

        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::Valid);
        assert_eq!(
            restored.state,
            RestoredState {
                position_steps: 12_345,
                target_steps: -40_000,
                going_forward: true,
                was_valid: true,
            }
        );
        // A valid record is not rewritten
        assert_eq!(store.flash.writes, 1);
    }

    #[test]
    fn test_first_boot_writes_default() {
        let mut store = store();
        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::Missing);
        assert_eq!(restored.state, default_state());
        assert_eq!(restored.reset_error, None);
        assert_eq!(store.flash.writes, 1);
        assert_eq!(
            stored_record(&store),
            PersistedRecord::fresh(AxisConfig::default().soft_limits())
        );

        // The default is itself a valid record on the next boot
        let again = block_on(store.load());
        assert_eq!(again.outcome, RestoreOutcome::Valid);
        assert!(again.state.was_valid);
    }

    #[test]
    fn test_bad_magic_falls_back_and_rewrites() {
        let mut store = store();
        let mut bytes = PersistedRecord {
            position_steps: 500,
            target_steps: 600,
            going_forward: true,
        }
        .encode();
        bytes[12] = 0;
        store.flash.preload(StorageKey::AxisPosition, &bytes);

        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::BadMagic);
        assert_eq!(restored.state, default_state());
        assert_eq!(store.flash.writes, 1);
        assert_eq!(stored_record(&store).position_steps, 0);
    }

    #[test]
    fn test_wrong_length_is_corrupt() {
        let mut store = store();
        store.flash.preload(StorageKey::AxisPosition, &[1, 2, 3]);
        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::Corrupt);
        assert_eq!(restored.state, default_state());
        assert_eq!(store.flash.writes, 1);
    }

    #[test]
    fn test_read_failure_falls_back() {
        let mut store = store();
        store.flash.fail_reads = true;
        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::ReadFailed);
        assert_eq!(restored.state, default_state());
    }

    #[test]
    fn test_rewrite_failure_is_reported() {
        let mut store = store();
        store.flash.fail_writes = true;
        let restored = block_on(store.load());
        assert_eq!(restored.outcome, RestoreOutcome::Missing);
        assert_eq!(restored.state, default_state());
        assert_eq!(restored.reset_error, Some(FlashError::Flash));
    }

    #[test]
    fn test_slack_band_edges() {
        // ±100 mm limits, 10 mm slack, 400 steps/mm: band is ±44000 steps
        for (position, outcome) in [
            (44_000, RestoreOutcome::Valid),
            (-44_000, RestoreOutcome::Valid),
            (44_001, RestoreOutcome::OutOfBand),
            (-44_400, RestoreOutcome::OutOfBand),
            (i32::MAX, RestoreOutcome::OutOfBand),
        ] {
            let mut store = store();
            let record = PersistedRecord {
                position_steps: position,
                target_steps: 0,
                going_forward: true,
            };
            store
                .flash
                .preload(StorageKey::AxisPosition, &record.encode());

            let restored = block_on(store.load());
            assert_eq!(restored.outcome, outcome, "position {position}");
            if outcome.is_valid() {
                assert_eq!(restored.state.position_steps, position);
                assert_eq!(store.flash.writes, 0);
            } else {
                assert_eq!(restored.state, default_state());
                assert_eq!(store.flash.writes, 1);
            }
        }
    }

    #[test]
    fn test_restored_position_inside_slack_is_kept() {
        // 5 mm past the upper limit, e.g. a write captured mid-move
        let mut store = store();
        let record = PersistedRecord {
            position_steps: 42_000,
            target_steps: 40_000,
            going_forward: false,
        };
        block_on(store.save(&record)).unwrap();
        let restored = block_on(store.load());
        assert!(restored.state.was_valid);
        assert_eq!(restored.state.position_steps, 42_000);
    }
}
