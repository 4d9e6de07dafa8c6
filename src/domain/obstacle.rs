//! Drawdown obstacle.

use crate::domain::DateUnix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A detected drawdown from a weekly local top to the first later weekly
/// point whose moving average fell by at least the configured fraction.
///
/// Dates are the observation days of the weekly samples, not the week labels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub peak_date: NaiveDate,
    pub peak_moving_average: f64,
    pub trough_date: NaiveDate,
    pub trough_moving_average: f64,
    /// `(peak - trough) / peak`.
    pub drawdown: f64,
}

impl Obstacle {
    pub fn trough_date_unix(&self) -> DateUnix {
        DateUnix::from_date(self.trough_date)
    }
}
