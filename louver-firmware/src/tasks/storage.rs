//! Persistence task
//!
//! Owns the flash. Writes the position records and tuning changes
//! signalled by the axis task, so the control loop never waits on flash.

use defmt::*;
use embassy_futures::select::{select, Either};

use louver_core::persist::PositionStore;
use louver_hal_rp2040::flash::Rp2040FlashStorage;

use crate::channels::{PERSIST_RECORD, TUNING_SAVE};
use crate::config::save_tuning;

/// Storage task - handles flash writes for position and tuning
#[embassy_executor::task]
pub async fn storage_task(mut store: PositionStore<Rp2040FlashStorage<'static>>) {
    info!("Storage task started");

    loop {
        match select(PERSIST_RECORD.wait(), TUNING_SAVE.wait()).await {
            Either::First(record) => match store.save(&record).await {
                Ok(()) => debug!(
                    "Position saved: {} steps, target {}, forward={}",
                    record.position_steps, record.target_steps, record.going_forward
                ),
                Err(e) => error!("Failed to save position: {:?}", e),
            },
            Either::Second(tuning) => match save_tuning(store.flash_mut(), &tuning).await {
                Ok(()) => info!(
                    "Motion tuning saved: {} steps/s, {} steps/s^2",
                    tuning.max_speed_steps_per_s, tuning.acceleration_steps_per_s2
                ),
                Err(e) => error!("Failed to save motion tuning: {:?}", e),
            },
        }
    }
}
