//! Inter-task communication channels
//!
//! Static embassy-sync primitives connecting the link tasks, the axis
//! control task and the storage task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use louver_core::config::MotionTuning;
use louver_core::persist::PersistedRecord;
use louver_protocol::{ErrorCode, Reply, Request};

/// Pending request lines; the control loop drains it between ticks
const REQUEST_CHANNEL_SIZE: usize = 4;

/// Pending reply lines
const REPLY_CHANNEL_SIZE: usize = 4;

/// One line received on the link: a parsed request, or the reason it
/// was rejected. Rejections travel through the control task too so
/// replies leave in the order the lines arrived.
pub type LinkLine = Result<Request, ErrorCode>;

/// Lines from the link RX task to the axis task
pub static REQUESTS: Channel<CriticalSectionRawMutex, LinkLine, REQUEST_CHANNEL_SIZE> =
    Channel::new();

/// Replies from the axis task to the link TX task
pub static REPLIES: Channel<CriticalSectionRawMutex, Reply, REPLY_CHANNEL_SIZE> = Channel::new();

/// Latest position record to write (latest value wins)
pub static PERSIST_RECORD: Signal<CriticalSectionRawMutex, PersistedRecord> = Signal::new();

/// Latest motion tuning to write (latest value wins)
pub static TUNING_SAVE: Signal<CriticalSectionRawMutex, MotionTuning> = Signal::new();
