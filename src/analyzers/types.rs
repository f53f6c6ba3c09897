//! Data types produced by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzers::utility::pct;

/// Label used for the bucket of absent values when handing series to a chart.
pub const ABSENT_LABEL: &str = "(absent)";

fn label(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT_LABEL).to_string()
}

/// One distinct value and its number of occurrences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountEntry {
    pub value: Option<String>,
    pub count: usize,
}

/// Value counts, descending by count, ties in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyCount {
    pub entries: Vec<CountEntry>,
}

impl FrequencyCount {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn get(&self, value: Option<&str>) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.value.as_deref() == value)
            .map(|e| e.count)
    }

    /// Percentage of the total held by each entry, in entry order.
    pub fn shares(&self) -> Vec<(Option<String>, f64)> {
        let total = self.total();
        self.entries
            .iter()
            .map(|e| (e.value.clone(), pct(e.count, total)))
            .collect()
    }

    /// Drops the absent-value bucket.
    pub fn present(&self) -> FrequencyCount {
        FrequencyCount {
            entries: self
                .entries
                .iter()
                .filter(|e| e.value.is_some())
                .cloned()
                .collect(),
        }
    }

    pub fn to_series(&self, title: &str) -> Series {
        Series {
            title: title.to_string(),
            points: self
                .entries
                .iter()
                .map(|e| SeriesPoint {
                    label: label(e.value.as_deref()),
                    value: e.count as f64,
                })
                .collect(),
        }
    }

    pub fn shares_series(&self, title: &str) -> Series {
        Series {
            title: title.to_string(),
            points: self
                .shares()
                .into_iter()
                .map(|(value, share)| SeriesPoint {
                    label: label(value.as_deref()),
                    value: share,
                })
                .collect(),
        }
    }
}

/// Mean of a numeric column within one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub key: Option<String>,
    /// `None` when the group has no present values.
    pub mean: Option<f64>,
    /// Rows that contributed a value to the mean.
    pub present: usize,
    pub rows: usize,
}

/// Group-wise means, ordered by key with the absent key last.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStat {
    pub groups: Vec<GroupMean>,
}

impl GroupStat {
    pub fn get(&self, key: Option<&str>) -> Option<&GroupMean> {
        self.groups.iter().find(|g| g.key.as_deref() == key)
    }

    /// Undefined means are emitted as NaN so the chart shows a gap, never a zero.
    pub fn to_series(&self, title: &str) -> Series {
        Series {
            title: title.to_string(),
            points: self
                .groups
                .iter()
                .map(|g| SeriesPoint {
                    label: label(g.key.as_deref()),
                    value: g.mean.unwrap_or(f64::NAN),
                })
                .collect(),
        }
    }
}

/// Interquartile-range fences of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
}

impl OutlierBounds {
    /// Inclusive on both fences.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower_fence && value <= self.upper_fence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// An ordered `(label, value)` sequence handed to the charting layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub title: String,
    pub points: Vec<SeriesPoint>,
}

/// `describe`-style summary of the present values of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Dataset diagnostics computed on the full table before projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub rows: usize,
    pub columns: usize,
    pub duplicate_rows: usize,
    /// Booking statuses of rows without a fare.
    pub statuses_without_value: FrequencyCount,
    /// Rows carrying a cancellation reason that disagrees with their status.
    pub reason_mismatches: usize,
    /// Rows whose status is absent or not a known booking status.
    pub unknown_statuses: usize,
}

/// Answers to the five questions plus the outlier pass.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub profile: Profile,

    // question 1
    pub status_counts: Series,
    pub status_shares: Series,

    // questions 2 and 3
    pub driver_cancel_reasons: Series,
    pub customer_cancel_reasons: Series,

    // question 4
    pub overcrowded_pickups: Series,

    // question 5, raw fares
    pub fare_by_vehicle: Series,
    pub completed_by_vehicle: Series,
    pub fare_summary: NumericSummary,
    /// `None` when no completed ride has a distance.
    pub distance_summary: Option<NumericSummary>,

    // question 5, outliers removed
    pub outlier_bounds: OutlierBounds,
    pub inliers: usize,
    pub outliers: usize,
    pub filtered_fare_by_vehicle: Series,
    pub filtered_completed_by_vehicle: Series,
}

impl Report {
    /// Every chart series, in question order.
    pub fn series(&self) -> Vec<&Series> {
        vec![
            &self.status_counts,
            &self.status_shares,
            &self.driver_cancel_reasons,
            &self.customer_cancel_reasons,
            &self.overcrowded_pickups,
            &self.fare_by_vehicle,
            &self.completed_by_vehicle,
            &self.filtered_fare_by_vehicle,
            &self.filtered_completed_by_vehicle,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shares_sum_to_hundred() {
        let counts = frequency(&[(Some("Completed"), 3), (Some("Incomplete"), 1)]);
        let shares = counts.shares();
        assert_eq!(shares[0].1, 75.0);
        assert_eq!(shares[1].1, 25.0);
    }

    #[test]
    fn test_present_drops_absent_bucket() {
        let counts = frequency(&[(None, 5), (Some("Customer related issue"), 2)]);
        let present = counts.present();
        assert_eq!(present.total(), 2);
        assert_eq!(present.get(None), None);
    }

    #[test]
    fn test_series_labels_absent_values() {
        let counts = frequency(&[(Some("Saket"), 2), (None, 1)]);
        let series = counts.to_series("pickups");
        assert_eq!(series.points[1].label, ABSENT_LABEL);
        assert_eq!(series.points[0].value, 2.0);
    }

    #[test]
    fn test_undefined_group_mean_is_nan_in_series() {
        let stat = GroupStat {
            groups: vec![GroupMean {
                key: Some("Auto".into()),
                mean: None,
                present: 0,
                rows: 2,
            }],
        };
        assert!(stat.to_series("fares").points[0].value.is_nan());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = OutlierBounds {
            q1: 11.0,
            q3: 13.0,
            iqr: 2.0,
            lower_fence: 8.0,
            upper_fence: 15.2,
        };
        assert!(bounds.contains(8.0));
        assert!(bounds.contains(15.2));
        assert!(!bounds.contains(7.99));
        assert!(!bounds.contains(100.0));
    }

    // Helper functions for tests
    fn frequency(entries: &[(Option<&str>, usize)]) -> FrequencyCount {
        FrequencyCount {
            entries: entries
                .iter()
                .map(|&(value, count)| CountEntry {
                    value: value.map(str::to_string),
                    count,
                })
                .collect(),
        }
    }
}
