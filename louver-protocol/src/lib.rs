//! Louver control protocol
//!
//! Text requests in the query-string shape used by the vent's control
//! API, carried one per line over a serial link:
//!
//! ```text
//! control?stepper_enable=1&stepper_position=4000\n
//! status\n
//! ```
//!
//! Every request gets exactly one reply line: `OK`, `ERR <reason>`, or a
//! `STATUS …` snapshot. Parsing never panics on any input.

#![no_std]
#![deny(unsafe_code)]

pub mod dispatch;
pub mod line;
pub mod reply;
pub mod request;

pub use dispatch::{execute, Outcome};
pub use line::{LineBuffer, LineError, MAX_LINE_LEN};
pub use reply::{ErrorCode, Reply, MAX_REPLY_LEN};
pub use request::{parse_request, ControlRequest, MoveRequest, ParseError, Request, MAX_PAIRS};
