//! Pure computation engine for the price pipeline.
//!
//! Nothing here does I/O or reads the clock; the same inputs always give the
//! same outputs, except for the sampler, which is random by contract.

pub mod drawdown;
pub mod merge;
pub mod sampler;

pub use drawdown::{
    detect_obstacles, detect_on_weekly, local_tops, resample_weekly, WeeklyPoint,
    DEFAULT_DRAWDOWN_THRESHOLD,
};
pub use merge::{merge, DEFAULT_MA_WINDOW};
pub use sampler::{sample, sample_with_rng};
