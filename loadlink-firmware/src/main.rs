//! LoadLink - Load-cell streaming firmware
//!
//! Samples two load cells on the RP2040 ADC and streams them to a host
//! logger over UART0 using the LoadLink handshake.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, Config as AdcConfig, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::Pull;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as RpUartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use loadlink_protocol::LinkConfig;

use crate::tasks::LoadCellCalibration;

mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Zero offset and gain of the analog load-cell amplifiers
const CALIBRATION: [LoadCellCalibration; channels::LOAD_CELLS] = [
    LoadCellCalibration {
        zero_counts: 2048,
        newtons_per_count: 4.88,
    },
    LoadCellCalibration {
        zero_counts: 2048,
        newtons_per_count: 4.88,
    },
];

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("LoadLink firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Line settings are fixed at startup
    let link_config = LinkConfig::default();
    let mut uart_config = RpUartConfig::default();
    uart_config.baudrate = link_config.uart.baudrate;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    info!("UART initialized at {} baud", link_config.uart.baudrate);

    // Load-cell amplifiers on ADC0/ADC1
    let adc = Adc::new(p.ADC, Irqs, AdcConfig::default());
    let cells = [
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
    ];
    info!("ADC initialized");

    spawner
        .spawn(tasks::sampler_task(adc, cells, CALIBRATION))
        .unwrap();
    spawner.spawn(tasks::link_task(uart, link_config)).unwrap();

    info!("All tasks spawned, firmware running");
}
