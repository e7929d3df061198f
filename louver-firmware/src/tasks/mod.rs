//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod axis;
pub mod link_rx;
pub mod link_tx;
pub mod storage;

pub use axis::{axis_task, VentStepper};
pub use link_rx::link_rx_task;
pub use link_tx::link_tx_task;
pub use storage::storage_task;
