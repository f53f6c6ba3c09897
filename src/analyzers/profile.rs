//! Dataset diagnostics run before the questions are answered.

use std::collections::HashSet;

use crate::analyzers::aggregate::value_counts;
use crate::analyzers::types::{FrequencyCount, NumericSummary, Profile};
use crate::analyzers::utility::{mean, percentile, sample_stddev, sorted_present};
use crate::booking::{
    BOOKING_STATUS, BOOKING_VALUE, BookingStatus, CUSTOMER_CANCEL_REASON, DRIVER_CANCEL_REASON,
};
use crate::error::{Error, Result};
use crate::table::Table;

/// Number of rows identical to an earlier row.
pub fn duplicate_rows(table: &Table) -> usize {
    let mut seen = HashSet::new();
    table.rows().filter(|row| !seen.insert(*row)).count()
}

/// Booking statuses of the rows where `value_column` is absent.
pub fn statuses_without_value(table: &Table, value_column: &str) -> Result<FrequencyCount> {
    let idx = table.column_index(value_column)?;
    let unpriced = table.select(|row| row[idx].is_none());
    value_counts(&unpriced, BOOKING_STATUS)
}

/// Rows whose cancellation reasons contradict their booking status.
///
/// Rows without a recognised status are skipped here and reported by
/// [`unknown_statuses`].
pub fn reason_mismatches(table: &Table) -> Result<usize> {
    let statuses = table.column(BOOKING_STATUS)?;
    let customer = table.column(CUSTOMER_CANCEL_REASON)?;
    let driver = table.column(DRIVER_CANCEL_REASON)?;

    Ok(statuses
        .zip(customer.zip(driver))
        .filter(|(status, (customer, driver))| {
            status
                .and_then(|s| s.parse::<BookingStatus>().ok())
                .is_some_and(|status| !status.admits_reasons(*customer, *driver))
        })
        .count())
}

/// Rows whose booking status is absent or not one of the known labels.
pub fn unknown_statuses(table: &Table) -> Result<usize> {
    Ok(table
        .column(BOOKING_STATUS)?
        .filter(|status| status.is_none_or(|s| s.parse::<BookingStatus>().is_err()))
        .count())
}

/// Count, mean, sample std, min, quartiles and max of the present values.
///
/// # Errors
///
/// [`Error::InsufficientData`] when the column has no present value.
pub fn describe(table: &Table, column: &str) -> Result<NumericSummary> {
    let sorted = sorted_present(&table.numeric_column(column)?);

    let (Some(&min), Some(&max), Some(mean)) = (sorted.first(), sorted.last(), mean(&sorted))
    else {
        return Err(Error::InsufficientData {
            column: column.to_string(),
            needed: 1,
            found: 0,
        });
    };
    let quartile = |p| percentile(&sorted, p).unwrap_or(f64::NAN);

    Ok(NumericSummary {
        column: column.to_string(),
        count: sorted.len(),
        mean,
        std: sample_stddev(&sorted, mean),
        min,
        q1: quartile(0.25),
        median: quartile(0.5),
        q3: quartile(0.75),
        max,
    })
}

/// Runs every diagnostic on the full table.
#[tracing::instrument(skip(table), fields(rows = table.len()))]
pub fn profile(table: &Table) -> Result<Profile> {
    let profile = Profile {
        rows: table.len(),
        columns: table.headers().len(),
        duplicate_rows: duplicate_rows(table),
        statuses_without_value: statuses_without_value(table, BOOKING_VALUE)?,
        reason_mismatches: reason_mismatches(table)?,
        unknown_statuses: unknown_statuses(table)?,
    };

    if profile.duplicate_rows > 0 {
        tracing::warn!(duplicates = profile.duplicate_rows, "Dataset has duplicate rows");
    }
    if profile.reason_mismatches > 0 {
        tracing::warn!(
            mismatches = profile.reason_mismatches,
            "Cancellation reasons disagree with booking status"
        );
    }
    if profile.unknown_statuses > 0 {
        tracing::warn!(
            rows = profile.unknown_statuses,
            "Rows without a recognised booking status"
        );
    }

    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::ANALYSIS_COLUMNS;

    #[test]
    fn test_duplicate_rows() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "2.5"],
            ["Completed", "", "", "Saket", "10", "Auto", "2.5"],
            ["Completed", "", "", "Saket", "11", "Auto", "2.5"],
            ["Completed", "", "", "Saket", "10", "Auto", "2.5"],
        ]);
        assert_eq!(duplicate_rows(&table), 2);
    }

    #[test]
    fn test_statuses_without_value() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "2.5"],
            ["No Driver Found", "", "", "Saket", "", "Auto", ""],
            ["Cancelled by Customer", "Driver is not moving towards pickup location", "", "Saket", "", "Auto", ""],
            ["No Driver Found", "", "", "Saket", "", "Auto", ""],
        ]);

        let counts = statuses_without_value(&table, BOOKING_VALUE).unwrap();
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(Some("No Driver Found")), Some(2));
        assert_eq!(counts.get(Some("Completed")), None);
    }

    #[test]
    fn test_reason_mismatches() {
        let table = bookings(&[
            ["Cancelled by Driver", "", "Customer related issue", "Saket", "", "Go Mini", ""],
            ["Completed", "Wrong Address", "", "Saket", "10", "eBike", "4"],
        ]);
        assert_eq!(reason_mismatches(&table).unwrap(), 1);
    }

    #[test]
    fn test_undecodable_rows_are_counted_not_rejected() {
        let table = bookings(&[
            ["Teleported", "", "Wrong Address", "Saket", "", "Auto", ""],
            ["", "", "", "Saket", "", "Auto", ""],
            ["Completed", "", "", "Saket", "10", "Uber Green", "2"],
            ["Completed", "", "", "Saket", "12", "", "3"],
            ["Completed", "Wrong Address", "", "Saket", "11", "Auto", "3"],
        ]);

        assert_eq!(reason_mismatches(&table).unwrap(), 1);
        assert_eq!(unknown_statuses(&table).unwrap(), 2);

        let p = profile(&table).unwrap();
        assert_eq!(p.reason_mismatches, 1);
        assert_eq!(p.unknown_statuses, 2);
    }

    #[test]
    fn test_describe() {
        let table = bookings(&[
            ["Completed", "", "", "Saket", "10", "Auto", "1"],
            ["Completed", "", "", "Saket", "12", "Auto", "2"],
            ["Completed", "", "", "Saket", "11", "Auto", "3"],
            ["Completed", "", "", "Saket", "13", "Auto", "4"],
            ["Completed", "", "", "Saket", "100", "Auto", "5"],
            ["Incomplete", "", "", "Saket", "", "Auto", ""],
        ]);

        let s = describe(&table, BOOKING_VALUE).unwrap();
        assert_eq!(s.count, 5);
        assert_eq!(s.mean, 29.2);
        assert_eq!(s.min, 10.0);
        assert_eq!(s.q1, 11.0);
        assert_eq!(s.median, 12.0);
        assert_eq!(s.q3, 13.0);
        assert_eq!(s.max, 100.0);
        assert!(s.std.unwrap() > 0.0);
    }

    #[test]
    fn test_describe_empty_column() {
        let table = bookings(&[["Incomplete", "", "", "Saket", "", "Auto", ""]]);
        assert!(matches!(
            describe(&table, BOOKING_VALUE),
            Err(Error::InsufficientData { .. })
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
