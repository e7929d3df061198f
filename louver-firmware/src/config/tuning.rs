//! Motion tuning persistence
//!
//! Speed and acceleration set over the control link are stored with
//! postcard so they survive a reboot.

use defmt::*;

use louver_core::config::MotionTuning;
use louver_hal_rp2040::flash::{FlashError, StorageKey};
use louver_hal_rp2040::FlashStorageTrait;

/// Maximum serialized tuning size
const MAX_TUNING_SIZE: usize = 32;

/// Tuning persistence errors
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TuningError {
    /// Flash operation failed
    Flash(FlashError),
    /// Deserialization failed
    Deserialize,
    /// Serialization failed
    Serialize,
    /// Stored values are not positive and finite
    Invalid,
}

impl From<FlashError> for TuningError {
    fn from(e: FlashError) -> Self {
        TuningError::Flash(e)
    }
}

/// Load stored tuning, if any
///
/// Returns `None` when nothing is stored or the stored data is unusable;
/// the configured values apply in that case.
pub async fn load_tuning<F: FlashStorageTrait>(storage: &mut F) -> Option<MotionTuning> {
    match load_tuning_inner(storage).await {
        Ok(tuning) => {
            info!(
                "Loaded motion tuning from flash: {} steps/s, {} steps/s^2",
                tuning.max_speed_steps_per_s, tuning.acceleration_steps_per_s2
            );
            Some(tuning)
        }
        Err(TuningError::Flash(FlashError::NotFound)) => {
            debug!("No motion tuning in flash, using configured values");
            None
        }
        Err(e) => {
            warn!("Failed to load motion tuning: {:?}, using configured values", e);
            None
        }
    }
}

async fn load_tuning_inner<F: FlashStorageTrait>(
    storage: &mut F,
) -> Result<MotionTuning, TuningError> {
    let mut buffer = [0u8; MAX_TUNING_SIZE];
    let len = storage.read(StorageKey::MotionTuning, &mut buffer).await?;

    let tuning: MotionTuning =
        postcard::from_bytes(&buffer[..len]).map_err(|_| TuningError::Deserialize)?;
    if !tuning.is_valid() {
        return Err(TuningError::Invalid);
    }
    Ok(tuning)
}

/// Save tuning to flash
pub async fn save_tuning<F: FlashStorageTrait>(
    storage: &mut F,
    tuning: &MotionTuning,
) -> Result<(), TuningError> {
    let mut buffer = [0u8; MAX_TUNING_SIZE];
    let bytes = postcard::to_slice(tuning, &mut buffer).map_err(|_| TuningError::Serialize)?;

    debug!("Saving {} bytes of motion tuning to flash", bytes.len());
    storage.write(StorageKey::MotionTuning, bytes).await?;
    Ok(())
}
