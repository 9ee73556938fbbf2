//! Inter-task shared state
//!
//! The sampler overwrites the latest reading; the link task sends whatever
//! is current when the host asks.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Number of load cells on the board
pub const LOAD_CELLS: usize = 2;

/// Latest load-cell forces in newtons
pub static LATEST_SAMPLE: Mutex<CriticalSectionRawMutex, Cell<[f32; LOAD_CELLS]>> =
    Mutex::new(Cell::new([0.0; LOAD_CELLS]));

/// Publish a new reading
pub fn publish(sample: [f32; LOAD_CELLS]) {
    LATEST_SAMPLE.lock(|cell| cell.set(sample));
}

/// Snapshot of the latest reading
pub fn latest() -> [f32; LOAD_CELLS] {
    LATEST_SAMPLE.lock(|cell| cell.get())
}
