use crate::domain::{MergedPoint, MergedSeries, PricePoint};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Default moving-average window, in days.
pub const DEFAULT_MA_WINDOW: usize = 7;

/// Merge the historical and recent series into one canonical series.
///
/// Both inputs are concatenated (historical first); when a day occurs more
/// than once the later row wins, so `recent` overrides `historical`. The
/// result is ascending by date, and each point carries the trailing mean of
/// the last `window` prices. Leading points whose window is incomplete are
/// dropped. A window of 0 is treated as 1.
pub fn merge(historical: &[PricePoint], recent: &[PricePoint], window: usize) -> MergedSeries {
    let window = window.max(1);

    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for point in historical.iter().chain(recent) {
        by_day.insert(point.date, point.price);
    }

    let days: Vec<(NaiveDate, f64)> = by_day.into_iter().collect();
    let points = days
        .windows(window)
        .map(|w| {
            let (date, price) = w[window - 1];
            let sum: f64 = w.iter().map(|(_, p)| p).sum();
            MergedPoint {
                date,
                price,
                moving_average: sum / window as f64,
            }
        })
        .collect();

    MergedSeries::new(window, points)
}
