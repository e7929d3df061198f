//! Power-loss-safe position persistence
//!
//! The axis position, its target and the oscillation direction are kept
//! in one fixed-layout record guarded by a magic marker. At boot the
//! record is trusted only if the marker matches and the position lies
//! within the soft limits plus a slack band; anything else is replaced
//! by a safe default that is written back at once.

pub mod record;
pub mod store;

pub use record::{PersistedRecord, RECORD_LEN, RECORD_MAGIC};
pub use store::{PositionStore, RestoreOutcome, Restored, RestoredState};
