mod fixed_tuner;
mod standard_tuner;

pub use fixed_tuner::FixedTuner;
pub use standard_tuner::StandardTuner;
