//! Control link transmit task

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPLIES;

/// Link TX task - writes one line per reply
#[embassy_executor::task]
pub async fn link_tx_task(mut tx: BufferedUartTx) {
    info!("Link TX task started");

    loop {
        let reply = REPLIES.receive().await;

        let line = match reply.to_line() {
            Ok(line) => line,
            Err(_) => {
                error!("Reply does not fit the line buffer");
                continue;
            }
        };

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send reply: {:?}", e);
        }
    }
}
