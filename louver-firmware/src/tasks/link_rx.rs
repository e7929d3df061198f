//! Control link receive task
//!
//! Splits the UART byte stream into lines, parses each one and queues it
//! for the axis task.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use louver_protocol::{parse_request, ErrorCode, LineBuffer};

use crate::channels::{LinkLine, REQUESTS};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Link RX task - receives and parses request lines
#[embassy_executor::task]
pub async fn link_rx_task(mut rx: BufferedUartRx) {
    info!("Link RX task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    let line: LinkLine = match lines.feed(byte) {
                        Ok(Some(line)) => parse_request(&line).map_err(|e| {
                            warn!("Rejected request: {:?}", e);
                            ErrorCode::from(e)
                        }),
                        Ok(None) => continue,
                        Err(e) => {
                            warn!("Request line too long, discarded");
                            Err(ErrorCode::from(e))
                        }
                    };
                    // Waits while the control loop is busy with a move;
                    // the UART buffer absorbs the backlog meanwhile
                    REQUESTS.send(line).await;
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
                lines.reset();
            }
        }
    }
}
