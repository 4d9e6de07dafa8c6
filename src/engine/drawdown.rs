use crate::domain::{MergedPoint, Obstacle};
use chrono::{Datelike, Duration, NaiveDate};

/// Default drawdown fraction that qualifies as an obstacle.
pub const DEFAULT_DRAWDOWN_THRESHOLD: f64 = 0.1;

/// Last observation of a Monday–Sunday week.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyPoint {
    /// The Sunday closing the week.
    pub week_ending: NaiveDate,
    pub point: MergedPoint,
}

fn week_ending(date: NaiveDate) -> NaiveDate {
    let days_to_sunday = 6 - i64::from(date.weekday().num_days_from_monday());
    date + Duration::days(days_to_sunday)
}

/// Resample an ascending daily series to weekly granularity, keeping the last
/// observation on or before each Sunday. Weeks without data produce nothing.
pub fn resample_weekly(points: &[MergedPoint]) -> Vec<WeeklyPoint> {
    let mut weekly: Vec<WeeklyPoint> = Vec::new();
    for point in points {
        if !point.moving_average.is_finite() {
            continue;
        }
        let label = week_ending(point.date);
        match weekly.last_mut() {
            Some(last) if last.week_ending == label => last.point = *point,
            _ => weekly.push(WeeklyPoint {
                week_ending: label,
                point: *point,
            }),
        }
    }
    weekly
}

/// Indices whose moving average strictly exceeds both neighbours.
///
/// The first and last points are never tops.
pub fn local_tops(averages: &[f64]) -> Vec<usize> {
    averages
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[1] > w[0] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Find drawdown obstacles on a series of weekly moving averages.
///
/// For each local top, scans forward and reports only the first later point
/// whose drawdown reaches `threshold`. Tops with no such point are skipped.
pub fn detect_on_weekly(weekly: &[WeeklyPoint], threshold: f64) -> Vec<Obstacle> {
    let averages: Vec<f64> = weekly.iter().map(|w| w.point.moving_average).collect();

    local_tops(&averages)
        .into_iter()
        .filter_map(|i| {
            let peak = weekly[i].point;
            weekly[i + 1..].iter().find_map(|candidate| {
                let trough = candidate.point;
                let drawdown = (peak.moving_average - trough.moving_average) / peak.moving_average;
                (drawdown >= threshold).then_some(Obstacle {
                    peak_date: peak.date,
                    peak_moving_average: peak.moving_average,
                    trough_date: trough.date,
                    trough_moving_average: trough.moving_average,
                    drawdown,
                })
            })
        })
        .collect()
}

/// Resample `points` weekly and detect obstacles.
pub fn detect_obstacles(points: &[MergedPoint], threshold: f64) -> Vec<Obstacle> {
    detect_on_weekly(&resample_weekly(points), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(date: NaiveDate, ma: f64) -> MergedPoint {
        MergedPoint {
            date,
            price: ma,
            moving_average: ma,
        }
    }

    /// One point per week, on consecutive Sundays starting 2021-01-03.
    fn weekly(averages: &[f64]) -> Vec<WeeklyPoint> {
        averages
            .iter()
            .enumerate()
            .map(|(i, ma)| {
                let date = day(2021, 1, 3) + Duration::weeks(i as i64);
                WeeklyPoint {
                    week_ending: date,
                    point: point(date, *ma),
                }
            })
            .collect()
    }

    #[test]
    fn test_week_ending_is_sunday() {
        // 2021-01-04 is a Monday.
        assert_eq!(week_ending(day(2021, 1, 4)), day(2021, 1, 10));
        assert_eq!(week_ending(day(2021, 1, 10)), day(2021, 1, 10));
        assert_eq!(week_ending(day(2021, 1, 11)), day(2021, 1, 17));
    }

    #[test]
    fn test_resample_keeps_last_observation_per_week() {
        let points = vec![
            point(day(2021, 1, 4), 1.0),
            point(day(2021, 1, 6), 2.0),
            point(day(2021, 1, 10), 3.0),
            point(day(2021, 1, 12), 4.0),
            // Week ending 2021-01-24 is empty.
            point(day(2021, 1, 26), 5.0),
        ];
        let weekly = resample_weekly(&points);
        assert_eq!(weekly.len(), 3);
        assert_eq!(weekly[0].week_ending, day(2021, 1, 10));
        assert_eq!(weekly[0].point.moving_average, 3.0);
        assert_eq!(weekly[1].week_ending, day(2021, 1, 17));
        assert_eq!(weekly[1].point.date, day(2021, 1, 12));
        assert_eq!(weekly[2].week_ending, day(2021, 1, 31));
    }

    #[test]
    fn test_resample_drops_undefined_averages() {
        let points = vec![point(day(2021, 1, 4), f64::NAN), point(day(2021, 1, 5), 2.0)];
        let weekly = resample_weekly(&points);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].point.moving_average, 2.0);
    }

    #[test]
    fn test_local_tops_require_strict_inequality() {
        assert_eq!(local_tops(&[100.0, 110.0, 105.0, 90.0, 95.0]), vec![1]);
        assert!(local_tops(&[5.0, 7.0, 7.0, 5.0]).is_empty());
        assert!(local_tops(&[3.0, 2.0]).is_empty());
        assert!(local_tops(&[]).is_empty());
    }

    #[test]
    fn test_first_qualifying_trough_wins() {
        let obstacles = detect_on_weekly(&weekly(&[100.0, 110.0, 105.0, 90.0, 95.0]), 0.1);
        assert_eq!(obstacles.len(), 1);
        let o = obstacles[0];
        assert_eq!(o.peak_moving_average, 110.0);
        assert_eq!(o.trough_moving_average, 90.0);
        assert!((o.drawdown - 20.0 / 110.0).abs() < 1e-12);
        assert_eq!(o.peak_date, day(2021, 1, 10));
        assert_eq!(o.trough_date, day(2021, 1, 24));
    }

    #[test]
    fn test_scan_stops_at_first_drop_past_threshold() {
        // Two drops past 10% after the top at 200: 170 (15%) then 100 (50%).
        let obstacles = detect_on_weekly(&weekly(&[100.0, 200.0, 170.0, 100.0, 120.0]), 0.1);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].trough_moving_average, 170.0);
        assert!((obstacles[0].drawdown - 0.15).abs() < 1e-12);
    }

    #[test]
    fn test_one_obstacle_per_peak() {
        let averages = [100.0, 120.0, 100.0, 130.0, 90.0, 95.0, 80.0, 85.0];
        let obstacles = detect_on_weekly(&weekly(&averages), 0.1);
        // Tops at 120, 130, 95; each reported at most once.
        assert_eq!(obstacles.len(), 3);
        let peaks: Vec<f64> = obstacles.iter().map(|o| o.peak_moving_average).collect();
        assert_eq!(peaks, vec![120.0, 130.0, 95.0]);
        for o in &obstacles {
            assert!(o.drawdown >= 0.1);
        }
    }

    #[test]
    fn test_top_without_qualifying_drop_emits_nothing() {
        let obstacles = detect_on_weekly(&weekly(&[100.0, 110.0, 105.0, 104.0]), 0.1);
        assert!(obstacles.is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let obstacles = detect_on_weekly(&weekly(&[50.0, 100.0, 90.0]), 0.1);
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn test_flat_series_has_no_obstacles() {
        let points: Vec<MergedPoint> = (0..100)
            .map(|i| point(day(2021, 1, 1) + Duration::days(i), 42.0))
            .collect();
        assert!(detect_obstacles(&points, 0.0).is_empty());
    }

    #[test]
    fn test_fewer_than_three_weeks_is_empty() {
        assert!(detect_on_weekly(&weekly(&[100.0, 10.0]), 0.1).is_empty());
        assert!(detect_obstacles(&[], 0.1).is_empty());
    }

    #[test]
    fn test_detect_obstacles_on_daily_series() {
        // Daily series over four weeks; weekly closes are 100, 110, 105, 90.
        let closes = [100.0, 110.0, 105.0, 90.0, 95.0];
        let mut points = Vec::new();
        for (week, close) in closes.iter().enumerate() {
            let sunday = day(2021, 1, 3) + Duration::weeks(week as i64);
            points.push(point(sunday - Duration::days(2), 1.0));
            points.push(point(sunday, *close));
        }
        let obstacles = detect_obstacles(&points, 0.1);
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].trough_date, day(2021, 1, 24));
    }
}
