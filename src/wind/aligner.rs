//! Maps wall-clock times onto the hourly forecast

use chrono::{NaiveDateTime, Timelike};
use tracing::debug;

use crate::models::WeatherSeries;

/// A sample this close to the target ends the scan, seconds
const GOOD_ENOUGH_SECS: i64 = 30 * 60;

/// Index of the forecast sample closest to `target`.
///
/// Scans linearly and stops at the first sample strictly within 30 minutes,
/// since the forecast is hourly. Unparsable timestamps are skipped. A series
/// without timestamps is indexed by hour of day, clamped to its length.
/// Never fails: degrades to index 0.
#[must_use]
pub fn align(series: &WeatherSeries, target: NaiveDateTime) -> usize {
    if !series.has_timestamps() {
        let hour = target.hour() as usize;
        let index = hour.min(series.len().saturating_sub(1));
        debug!("Forecast has no timestamps, using hour-of-day index {}", index);
        return index;
    }

    let mut best_index = 0;
    let mut min_diff = i64::MAX;

    for (index, timestamp) in series.timestamps.iter().enumerate() {
        let Some(timestamp) = timestamp else {
            continue;
        };

        let diff = (*timestamp - target).num_seconds().abs();
        if diff < min_diff {
            min_diff = diff;
            best_index = index;
        }

        if diff < GOOD_ENOUGH_SECS {
            break;
        }
    }

    best_index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::weather::TIME_FORMAT;
    use rstest::rstest;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIME_FORMAT).unwrap()
    }

    fn hourly(start: &str, hours: usize) -> WeatherSeries {
        let start = ts(start);
        WeatherSeries {
            timestamps: (0..hours)
                .map(|h| Some(start + chrono::Duration::hours(h as i64)))
                .collect(),
            wind_speed: vec![Some(10.0); hours],
            wind_direction: vec![Some(180.0); hours],
            temperature: vec![],
        }
    }

    #[rstest]
    #[case("2024-06-01T00:00", 0)]
    #[case("2024-06-01T09:00", 9)]
    #[case("2024-06-01T09:29", 9)]
    // 09:00 is already within 30 min, so the scan stops before 10:00
    #[case("2024-06-01T09:31", 9)]
    #[case("2024-06-01T09:45", 10)]
    #[case("2024-06-02T23:00", 47)]
    #[case("2024-06-05T12:00", 47)]
    #[case("2024-05-20T12:00", 0)]
    fn test_nearest_sample(#[case] target: &str, #[case] expected: usize) {
        let series = hourly("2024-06-01T00:00", 48);
        assert_eq!(align(&series, ts(target)), expected);
    }

    #[test]
    fn test_exact_half_hour_keeps_earlier_sample() {
        // 09:30 is 30 min from both 09:00 and 10:00; neither is strictly within
        // 30 min, and the earlier one wins the tie.
        let series = hourly("2024-06-01T00:00", 24);
        assert_eq!(align(&series, ts("2024-06-01T09:30")), 9);
    }

    #[test]
    fn test_unparsable_timestamps_skipped() {
        let mut series = hourly("2024-06-01T00:00", 24);
        series.timestamps[9] = None;
        assert_eq!(align(&series, ts("2024-06-01T09:00")), 8);
    }

    #[test]
    fn test_all_timestamps_unparsable() {
        let mut series = hourly("2024-06-01T00:00", 3);
        series.timestamps = vec![None; 3];
        assert_eq!(align(&series, ts("2024-06-01T02:00")), 0);
    }

    #[test]
    fn test_hour_of_day_fallback() {
        let mut series = hourly("2024-06-01T00:00", 24);
        series.timestamps.clear();
        assert_eq!(align(&series, ts("2024-06-03T14:45")), 14);

        series.wind_speed.truncate(6);
        assert_eq!(align(&series, ts("2024-06-03T14:45")), 5);

        series.wind_speed.clear();
        assert_eq!(align(&series, ts("2024-06-03T14:45")), 0);
    }
}
