//! Louver - Vent Controller Firmware
//!
//! Main firmware binary for an RP2040 driving one lead-screw vent axis
//! through a STEP/DIR stepper driver, controlled over a UART link.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use louver_core::axis::AxisController;
use louver_core::config::AxisConfig;
use louver_core::persist::{PositionStore, Restored};
use louver_drivers::stepper::PulseStepper;
use louver_hal_rp2040::flash::Rp2040FlashStorage;

use crate::config::{load_tuning, parse_config, VentConfig};

/// Embedded configuration (compiled into firmware)
/// Edit vent.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../vent.toml");

mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Louver firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let mut vent = load_embedded_config();

    // Restore position and tuning before any motion can start
    let flash = Rp2040FlashStorage::new(p.FLASH, p.DMA_CH0);
    let mut store = PositionStore::new(flash, vent.axis);
    let restored = store.load().await;
    log_restore(&restored, &vent.axis);

    if let Some(tuning) = load_tuning(store.flash_mut()).await {
        vent.axis = vent.axis.with_tuning(tuning);
    }

    // Step output (Pico: STEP=GPIO2, DIR=GPIO3, EN=GPIO4), driver off
    let enable_off = if vent.driver.enable_active_low {
        Level::High
    } else {
        Level::Low
    };
    let stepper = PulseStepper::new(
        Output::new(p.PIN_2, Level::Low),
        Output::new(p.PIN_3, Level::Low),
        Output::new(p.PIN_4, enable_off),
        Delay,
        vent.driver,
    );

    // The config was validated on load and stored tuning is checked
    // before it is applied
    let axis = unwrap!(AxisController::new(vent.axis, &restored.state, stepper));
    info!(
        "Axis ready: {} steps/mm, limits {}..{} steps, disabled",
        vent.axis.steps_per_mm(),
        axis.limits().min_steps,
        axis.limits().max_steps
    );

    // Control link on UART0 (GPIO0 TX, GPIO1 RX), 115200 baud default
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for the control link");

    spawner.spawn(tasks::storage_task(store)).unwrap();
    spawner.spawn(tasks::link_rx_task(rx)).unwrap();
    spawner.spawn(tasks::link_tx_task(tx)).unwrap();
    spawner.spawn(tasks::axis_task(axis)).unwrap();

    info!("All tasks spawned, firmware running");
}

/// Parse and validate the embedded vent.toml
///
/// Falls back to built-in defaults if the file does not parse or
/// describes an unusable axis.
fn load_embedded_config() -> VentConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to parse embedded config: {:?}", e);
            error!("Using built-in defaults");
            return VentConfig::default();
        }
    };

    if let Err(e) = config.axis.validate() {
        error!("Embedded axis config invalid: {:?}", e);
        error!("Using built-in defaults");
        return VentConfig::default();
    }

    info!("Parsed embedded configuration successfully");
    config
}

/// Report what the position store found
fn log_restore(restored: &Restored, axis: &AxisConfig) {
    let state = &restored.state;
    if restored.outcome.is_valid() {
        info!(
            "Restored position {} steps ({} mm), last target {}, forward={}",
            state.position_steps,
            axis.steps_to_mm(state.position_steps),
            state.target_steps,
            state.going_forward
        );
    } else {
        warn!(
            "Stored position unusable ({:?}), starting at {} steps",
            restored.outcome, state.position_steps
        );
    }
    if let Some(e) = restored.reset_error {
        error!("Failed to write default position record: {:?}", e);
    }
}
