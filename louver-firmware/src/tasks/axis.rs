//! Axis control task
//!
//! Owns the [`AxisController`] and ticks it as often as the executor
//! allows while the vent moves. Requests are drained without blocking
//! between ticks; position records and tuning changes are handed to the
//! storage task through signals so no flash access happens here.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_futures::yield_now;
use embassy_rp::gpio::Output;
use embassy_time::{Delay, Instant, Timer};

use louver_core::axis::{AxisController, AxisEvent, AxisState};
use louver_drivers::stepper::PulseStepper;
use louver_protocol::{execute, Reply};

use crate::channels::{LinkLine, PERSIST_RECORD, REPLIES, REQUESTS, TUNING_SAVE};

/// How long the loop sleeps between checks while the axis is at rest
const IDLE_POLL_MS: u64 = 50;

/// STEP/DIR/EN output on RP2040 GPIO
pub type VentStepper = PulseStepper<Output<'static>, Output<'static>, Output<'static>, Delay>;

/// Axis control task
#[embassy_executor::task]
pub async fn axis_task(mut axis: AxisController<VentStepper>) {
    info!("Axis task started at {} steps", axis.position());

    loop {
        while let Ok(line) = REQUESTS.try_receive() {
            handle_line(&mut axis, line);
        }

        let now_us = Instant::now().as_micros();
        match axis.on_tick(now_us) {
            Some(AxisEvent::MoveComplete {
                position_steps,
                automatic,
                next_target,
            }) => {
                info!(
                    "Move complete at {} steps ({} mm), automatic={}",
                    position_steps,
                    axis.config().steps_to_mm(position_steps),
                    automatic
                );
                if let Some(target) = next_target {
                    info!("Auto mode: next target {} steps", target);
                }
            }
            Some(AxisEvent::Stepped(_)) | None => {}
        }

        if let Some(record) = axis.maybe_persist(now_us) {
            PERSIST_RECORD.signal(record);
        }

        if axis.state() == AxisState::Moving {
            yield_now().await;
        } else {
            // At rest: sleep until a request arrives or the next
            // persistence check is due
            if let Either::First(line) =
                select(REQUESTS.receive(), Timer::after_millis(IDLE_POLL_MS)).await
            {
                handle_line(&mut axis, line);
            }
        }
    }
}

/// Execute one request line and queue its reply
fn handle_line(axis: &mut AxisController<VentStepper>, line: LinkLine) {
    let reply = match line {
        Ok(request) => {
            let outcome = execute(axis, &request);
            match outcome.reply {
                Reply::Error(code) => warn!("Request rejected: {}", code.as_str()),
                _ => debug!("Request accepted: {} operation(s)", request.len()),
            }
            if let Some(estimate) = outcome.estimate {
                info!(
                    "Move to {} steps, estimated {} s ({:?}, peak {} steps/s)",
                    axis.target(),
                    estimate.total_time_s,
                    estimate.shape,
                    estimate.peak_speed_steps_per_s
                );
            }
            if outcome.tuning_changed {
                TUNING_SAVE.signal(axis.tuning());
            }
            outcome.reply
        }
        Err(code) => Reply::Error(code),
    };

    if REPLIES.try_send(reply).is_err() {
        warn!("Reply queue full, dropping reply");
    }
}
