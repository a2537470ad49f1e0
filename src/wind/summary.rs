//! Folds scored segments into round-trip totals and a direction decision

use crate::geometry::round_to;
use crate::models::{Direction, RouteSummary, SegmentAnalysis, WindImpact};

/// Running totals for one traversal direction
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct DirectionTotals {
    time_minutes: f64,
    headwind_km: f64,
    favorable_segments: usize,
}

impl DirectionTotals {
    fn add(self, impact: WindImpact, estimated_time: f64, distance_km: f64) -> Self {
        let time_minutes = self.time_minutes + estimated_time;
        match impact {
            WindImpact::Unfavorable => Self {
                time_minutes,
                headwind_km: self.headwind_km + distance_km,
                ..self
            },
            WindImpact::Favorable => Self {
                time_minutes,
                favorable_segments: self.favorable_segments + 1,
                ..self
            },
            WindImpact::Crosswind => Self {
                time_minutes,
                ..self
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Totals {
    normal: DirectionTotals,
    reverse: DirectionTotals,
    distance_km: f64,
}

impl Totals {
    fn add(self, analysis: &SegmentAnalysis) -> Self {
        let distance = analysis.segment.distance_km;
        Self {
            normal: self.normal.add(
                analysis.normal.impact,
                analysis.normal.estimated_time_minutes,
                distance,
            ),
            reverse: self.reverse.add(
                analysis.reverse.impact,
                analysis.reverse.estimated_time_minutes,
                distance,
            ),
            distance_km: self.distance_km + distance,
        }
    }

    fn finish(self) -> RouteSummary {
        let total_time_normal = round_to(self.normal.time_minutes, 2);
        let total_time_reverse = round_to(self.reverse.time_minutes, 2);

        // Decided on the presented values so the summary never contradicts itself
        let best_direction = if total_time_normal <= total_time_reverse {
            Direction::Normal
        } else {
            Direction::Reverse
        };

        RouteSummary {
            total_time_normal,
            total_time_reverse,
            headwind_distance_normal: round_to(self.normal.headwind_km, 2),
            headwind_distance_reverse: round_to(self.reverse.headwind_km, 2),
            favorable_segments_normal: self.normal.favorable_segments,
            favorable_segments_reverse: self.reverse.favorable_segments,
            total_distance: round_to(self.distance_km, 2),
            best_direction,
            time_saved_minutes: round_to((total_time_normal - total_time_reverse).abs(), 2),
        }
    }
}

/// Summarize a scored route
#[must_use]
pub fn summarize(analyses: &[SegmentAnalysis]) -> RouteSummary {
    analyses
        .iter()
        .fold(Totals::default(), Totals::add)
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DirectionalImpact, Point, Segment};
    use chrono::NaiveDateTime;

    fn analysis(
        distance_km: f64,
        normal: (WindImpact, f64),
        reverse: (WindImpact, f64),
    ) -> SegmentAnalysis {
        SegmentAnalysis {
            segment: Segment {
                id: 0,
                start: Point::new(45.0, 5.0),
                end: Point::new(45.1, 5.0),
                distance_km,
                bearing_deg: 0.0,
                bearing_text: "N".to_string(),
            },
            segment_datetime: NaiveDateTime::default(),
            cumulative_time: 0.0,
            base_time_minutes: 0.0,
            wind_speed: 10.0,
            wind_direction: 0.0,
            wind_direction_text: "N".to_string(),
            normal: DirectionalImpact {
                impact: normal.0,
                factor: 0.0,
                estimated_time_minutes: normal.1,
            },
            reverse: DirectionalImpact {
                impact: reverse.0,
                factor: 0.0,
                estimated_time_minutes: reverse.1,
            },
        }
    }

    #[test]
    fn test_totals_and_counts() {
        let analyses = vec![
            analysis(5.0, (WindImpact::Unfavorable, 15.0), (WindImpact::Favorable, 10.2)),
            analysis(3.0, (WindImpact::Crosswind, 8.1), (WindImpact::Crosswind, 8.1)),
            analysis(2.5, (WindImpact::Favorable, 5.1), (WindImpact::Unfavorable, 7.5)),
        ];
        let summary = summarize(&analyses);

        assert_eq!(summary.total_time_normal, 28.2);
        assert_eq!(summary.total_time_reverse, 25.8);
        assert_eq!(summary.headwind_distance_normal, 5.0);
        assert_eq!(summary.headwind_distance_reverse, 2.5);
        assert_eq!(summary.favorable_segments_normal, 1);
        assert_eq!(summary.favorable_segments_reverse, 1);
        assert_eq!(summary.total_distance, 10.5);
        assert_eq!(summary.best_direction, Direction::Reverse);
        assert_eq!(summary.time_saved_minutes, 2.4);
    }

    #[test]
    fn test_tie_prefers_normal() {
        let analyses = vec![analysis(
            4.0,
            (WindImpact::Crosswind, 12.0),
            (WindImpact::Crosswind, 12.0),
        )];
        let summary = summarize(&analyses);
        assert_eq!(summary.best_direction, Direction::Normal);
        assert_eq!(summary.time_saved_minutes, 0.0);
    }

    #[test]
    fn test_empty_route() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_time_normal, 0.0);
        assert_eq!(summary.total_distance, 0.0);
        assert_eq!(summary.best_direction, Direction::Normal);
    }

    #[test]
    fn test_best_direction_consistent_with_rounded_totals() {
        // Unrounded normal is slightly larger, but both present as 10.0
        let analyses = vec![analysis(
            4.0,
            (WindImpact::Crosswind, 10.001),
            (WindImpact::Crosswind, 10.0),
        )];
        let summary = summarize(&analyses);
        assert_eq!(summary.total_time_normal, summary.total_time_reverse);
        assert_eq!(summary.best_direction, Direction::Normal);
    }
}
