//! Host-side test doubles shared by the unit tests

use core::cell::RefCell;

use louver_hal::{FlashError, FlashStorage, StorageKey};

use crate::traits::{Direction, StepPulseSink};

/// Step sink that records what the motion code asked of the driver
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub enabled: bool,
    pub enable_calls: u32,
    pub forward_steps: u32,
    pub reverse_steps: u32,
    pub last_direction: Option<Direction>,
}

impl RecordingSink {
    /// Net displacement the driver has been told to produce
    pub fn net_steps(&self) -> i64 {
        self.forward_steps as i64 - self.reverse_steps as i64
    }
}

impl StepPulseSink for RecordingSink {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        self.enable_calls += 1;
    }

    fn step(&mut self, direction: Direction) {
        match direction {
            Direction::Forward => self.forward_steps += 1,
            Direction::Reverse => self.reverse_steps += 1,
        }
        self.last_direction = Some(direction);
    }
}

const SLOTS: usize = 2;
const SLOT_SIZE: usize = 64;

/// In-memory flash with one slot per storage key
#[derive(Debug, Default)]
pub struct MemoryFlash {
    slots: RefCell<[Option<([u8; SLOT_SIZE], usize)>; SLOTS]>,
    pub writes: u32,
    pub fail_writes: bool,
    pub fail_reads: bool,
}

impl MemoryFlash {
    /// Put raw bytes under a key, bypassing the write counter
    pub fn preload(&mut self, key: StorageKey, data: &[u8]) {
        let mut slot = [0u8; SLOT_SIZE];
        slot[..data.len()].copy_from_slice(data);
        self.slots.borrow_mut()[key.as_u8() as usize] = Some((slot, data.len()));
    }

    /// Raw bytes currently stored under a key
    pub fn raw(&self, key: StorageKey) -> Option<([u8; SLOT_SIZE], usize)> {
        self.slots.borrow()[key.as_u8() as usize]
    }
}

impl FlashStorage for MemoryFlash {
    async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
        if self.fail_reads {
            return Err(FlashError::Flash);
        }
        match self.slots.borrow()[key.as_u8() as usize] {
            Some((data, len)) => {
                if buffer.len() < len {
                    return Err(FlashError::BufferTooSmall);
                }
                buffer[..len].copy_from_slice(&data[..len]);
                Ok(len)
            }
            None => Err(FlashError::NotFound),
        }
    }

    async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
        if self.fail_writes {
            return Err(FlashError::Flash);
        }
        if data.len() > SLOT_SIZE {
            return Err(FlashError::Full);
        }
        self.writes += 1;
        self.preload(key, data);
        Ok(())
    }
}
