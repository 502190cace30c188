//! Wire schemas consumed by the tracker
//!
//! - `stride.training_day.v1`: one day of a training plan, as delivered by the
//!   workout-definition source
//! - `stride.sample.v1`: cumulative distance/speed samples from the motion
//!   provider, one per line in NDJSON streams

mod sample;
mod training_day;

pub use sample::*;
pub use training_day::*;
