use chrono::Utc;
use tracing::info;

use crate::analyzers::aggregate::{completed, filter_then_count, group_mean, value_counts};
use crate::analyzers::outlier::{outlier_bounds, partition};
use crate::analyzers::profile::{describe, profile};
use crate::analyzers::types::{FrequencyCount, Report};
use crate::booking::{
    ANALYSIS_COLUMNS, BOOKING_STATUS, CUSTOMER_CANCEL_REASON, DRIVER_CANCEL_REASON,
    PICKUP_LOCATION, RIDE_DISTANCE, VEHICLE_TYPE,
};
use crate::config::QuestionConfig;
use crate::error::{Error, Result};
use crate::table::Table;

/// Answers the five booking questions for a loaded table.
///
/// Diagnostics run on the full table; everything else runs on the projected
/// analysis columns. Fares are aggregated twice: once raw, once with the
/// completed-ride outliers removed.
#[tracing::instrument(skip(table, questions), fields(rows = table.len()))]
pub fn analyze(source: &str, table: &Table, questions: &QuestionConfig) -> Result<Report> {
    let profile = profile(table)?;
    let data = table.project(&ANALYSIS_COLUMNS)?;

    let statuses = value_counts(&data, BOOKING_STATUS)?;
    let driver_reasons = value_counts(&data, DRIVER_CANCEL_REASON)?.present();
    let customer_reasons = value_counts(&data, CUSTOMER_CANCEL_REASON)?.present();

    let overcrowded = FrequencyCount {
        entries: filter_then_count(
            &data,
            DRIVER_CANCEL_REASON,
            &questions.overcrowding_reason,
            PICKUP_LOCATION,
            questions.top_locations,
        )?,
    };
    if overcrowded.entries.is_empty() {
        info!(
            reason = %questions.overcrowding_reason,
            "No driver cancellations with this reason"
        );
    }

    let fare_column = questions.fare_column.as_str();
    let completed_rides = completed(&data)?;
    let fare_by_vehicle = group_mean(&data, VEHICLE_TYPE, fare_column)?;
    let completed_by_vehicle = value_counts(&completed_rides, VEHICLE_TYPE)?;

    let bounds = outlier_bounds(&completed_rides, fare_column)?;
    let (inliers, outliers) = partition(&completed_rides, fare_column, &bounds)?;
    info!(
        lower_fence = bounds.lower_fence,
        upper_fence = bounds.upper_fence,
        inliers = inliers.len(),
        outliers = outliers.len(),
        "Fare outliers partitioned"
    );

    let distance_summary = match describe(&completed_rides, RIDE_DISTANCE) {
        Ok(summary) => Some(summary),
        Err(Error::InsufficientData { .. }) => {
            info!("No completed ride has a distance");
            None
        }
        Err(err) => return Err(err),
    };

    let filtered_fare_by_vehicle = group_mean(&inliers, VEHICLE_TYPE, fare_column)?;
    let filtered_completed_by_vehicle = value_counts(&inliers, VEHICLE_TYPE)?;

    Ok(Report {
        generated_at: Utc::now(),
        source: source.to_string(),
        profile,
        status_counts: statuses.to_series("status_counts"),
        status_shares: statuses.shares_series("status_shares"),
        driver_cancel_reasons: driver_reasons.to_series("driver_cancel_reasons"),
        customer_cancel_reasons: customer_reasons.to_series("customer_cancel_reasons"),
        overcrowded_pickups: overcrowded.to_series("overcrowded_pickups"),
        fare_by_vehicle: fare_by_vehicle.to_series("fare_by_vehicle"),
        completed_by_vehicle: completed_by_vehicle.to_series("completed_by_vehicle"),
        fare_summary: describe(&completed_rides, fare_column)?,
        distance_summary,
        outlier_bounds: bounds,
        inliers: inliers.len(),
        outliers: outliers.len(),
        filtered_fare_by_vehicle: filtered_fare_by_vehicle.to_series("filtered_fare_by_vehicle"),
        filtered_completed_by_vehicle: filtered_completed_by_vehicle
            .to_series("filtered_completed_by_vehicle"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::BOOKING_VALUE;

    #[test]
    fn test_analyze_small_table() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "2"],
            ["Completed", "", "", "Saket", "12", "Auto", "3"],
            ["Completed", "", "", "Saket", "11", "Go Mini", "3"],
            ["Completed", "", "", "Saket", "13", "Go Mini", "4"],
            ["Completed", "", "", "Saket", "100", "Go Mini", "4"],
            ["Cancelled by Driver", "", "More than permitted people in there", "Nehru Place", "", "Auto", ""],
            ["Cancelled by Customer", "Wrong Address", "", "Saket", "", "Auto", ""],
        ]);

        let report = analyze("memory", &table, &QuestionConfig::default()).unwrap();

        assert_eq!(report.profile.rows, 7);
        assert_eq!(report.status_counts.points[0].label, "Completed");
        assert_eq!(report.status_counts.points[0].value, 5.0);
        assert_eq!(report.driver_cancel_reasons.points.len(), 1);
        assert_eq!(report.overcrowded_pickups.points[0].label, "Nehru Place");
        assert_eq!(report.inliers, 4);
        assert_eq!(report.outliers, 1);

        let go_mini = |series: &crate::analyzers::types::Series| {
            series
                .points
                .iter()
                .find(|p| p.label == "Go Mini")
                .map(|p| p.value)
        };
        assert_eq!(go_mini(&report.fare_by_vehicle), Some(124.0 / 3.0));
        assert_eq!(go_mini(&report.filtered_fare_by_vehicle), Some(12.0));
        assert_eq!(go_mini(&report.filtered_completed_by_vehicle), Some(2.0));
    }

    #[test]
    fn test_analyze_tolerates_unknown_and_missing_vehicle_types() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "2"],
            ["Completed", "", "", "Saket", "12", "Uber Green", "3"],
            ["Completed", "", "", "Saket", "11", "Auto", "3"],
            ["Completed", "", "", "Saket", "13", "", "4"],
            ["Completed", "", "", "Saket", "14", "Auto", "4"],
        ]);

        let report = analyze("memory", &table, &QuestionConfig::default()).unwrap();

        assert_eq!(report.profile.unknown_statuses, 0);
        assert_eq!(report.status_counts.points[0].value, 5.0);
        let green = report
            .fare_by_vehicle
            .points
            .iter()
            .find(|p| p.label == "Uber Green")
            .map(|p| p.value);
        assert_eq!(green, Some(12.0));
        assert_eq!(report.fare_by_vehicle.points.len(), 3);
    }

    #[test]
    fn test_analyze_without_distances() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", ""],
            ["Completed", "", "", "Saket", "12", "Auto", ""],
            ["Completed", "", "", "Saket", "11", "Go Mini", ""],
            ["Completed", "", "", "Saket", "13", "Go Mini", ""],
        ]);

        let report = analyze("memory", &table, &QuestionConfig::default()).unwrap();

        assert_eq!(report.distance_summary, None);
        assert_eq!(report.fare_summary.count, 4);
        assert_eq!(report.inliers, 4);
    }

    #[test]
    fn test_analyze_needs_enough_fares() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "2"],
            ["Incomplete", "", "", "Saket", "", "Auto", ""],
        ]);
        let err = analyze("memory", &table, &QuestionConfig::default()).unwrap_err();
        match err {
            Error::InsufficientData { column, .. } => assert_eq!(column, BOOKING_VALUE),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_analyze_missing_column() {
        let table = Table::new(
            vec![BOOKING_STATUS.into(), BOOKING_VALUE.into()],
            vec![vec![Some("Completed".into()), Some("1".into())]],
        )
        .unwrap();
        assert!(matches!(
            analyze("memory", &table, &QuestionConfig::default()),
            Err(Error::Schema { .. })
        ));
    }

    // Helper functions for tests
    fn bookings(rows: &[[&str; 7]]) -> Table {
        Table::new(
            ANALYSIS_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| {
                    row.iter()
                        .map(|c| (!c.is_empty()).then(|| c.to_string()))
                        .collect()
                })
                .collect(),
        )
        .unwrap()
    }
}
