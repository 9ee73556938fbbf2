//! Load-cell sampling task
//!
//! Reads each amplifier output on the ADC and converts it to newtons with
//! a linear calibration.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use crate::channels::{publish, LOAD_CELLS};

/// Sampling period
const SAMPLE_PERIOD_MS: u64 = 10;

/// Linear ADC-to-force calibration for one cell
#[derive(Clone, Copy, Format)]
pub struct LoadCellCalibration {
    /// ADC reading with no load
    pub zero_counts: u16,
    /// Newtons per ADC count
    pub newtons_per_count: f32,
}

impl LoadCellCalibration {
    /// Convert a raw reading to newtons
    pub fn to_newtons(&self, counts: u16) -> f32 {
        (f32::from(counts) - f32::from(self.zero_counts)) * self.newtons_per_count
    }
}

/// Sampler task - refreshes the latest sample every period
#[embassy_executor::task]
pub async fn sampler_task(
    mut adc: Adc<'static, Async>,
    mut cells: [Channel<'static>; LOAD_CELLS],
    calibration: [LoadCellCalibration; LOAD_CELLS],
) {
    info!("Sampler task started");

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_PERIOD_MS));
    let mut sample = [0.0f32; LOAD_CELLS];

    loop {
        for (i, channel) in cells.iter_mut().enumerate() {
            match adc.read(channel).await {
                Ok(counts) => sample[i] = calibration[i].to_newtons(counts),
                Err(e) => warn!("ADC read failed on cell {}: {:?}", i, e),
            }
        }
        publish(sample);
        ticker.next().await;
    }
}
