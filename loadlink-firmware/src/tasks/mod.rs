//! Embassy tasks

mod link;
mod sampler;

pub use link::link_task;
pub use sampler::{sampler_task, LoadCellCalibration};
