//! Price series types.

use crate::domain::DateUnix;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily price observation from either source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// A merged observation carrying its trailing moving average.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedPoint {
    pub date: NaiveDate,
    pub price: f64,
    pub moving_average: f64,
}

impl MergedPoint {
    pub fn date_unix(&self) -> DateUnix {
        DateUnix::from_date(self.date)
    }
}

/// Canonical ascending, deduplicated series with a `k`-day moving average.
///
/// Only points with a complete averaging window are present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedSeries {
    window: usize,
    points: Vec<MergedPoint>,
}

impl MergedSeries {
    pub(crate) fn new(window: usize, points: Vec<MergedPoint>) -> Self {
        Self { window, points }
    }

    /// Moving-average window the series was built with.
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn points(&self) -> &[MergedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
