//! Interquartile-range outlier fences.
//!
//! The fences are deliberately asymmetric: values are allowed to sit further
//! below Q1 (1.5 IQR) than above Q3 (1.1 IQR).

use tracing::debug;

use crate::analyzers::types::OutlierBounds;
use crate::analyzers::utility::{percentile, sorted_present};
use crate::error::{Error, Result};
use crate::table::Table;

pub const LOWER_FENCE_FACTOR: f64 = 1.5;
pub const UPPER_FENCE_FACTOR: f64 = 1.1;

/// Quartiles are underdetermined below this many present values.
pub const MIN_PRESENT_VALUES: usize = 4;

/// Computes the fences of `column` over every row of `table`.
///
/// Callers pass the completed-ride subset (see
/// [`completed`](crate::analyzers::aggregate::completed)).
///
/// # Errors
///
/// [`Error::InsufficientData`] with fewer than four present values, and
/// [`Error::Schema`] if the column is missing or not numeric.
pub fn outlier_bounds(table: &Table, column: &str) -> Result<OutlierBounds> {
    let sorted = sorted_present(&table.numeric_column(column)?);

    if sorted.len() < MIN_PRESENT_VALUES {
        return Err(insufficient(column, sorted.len()));
    }
    let (Some(q1), Some(q3)) = (percentile(&sorted, 0.25), percentile(&sorted, 0.75)) else {
        return Err(insufficient(column, sorted.len()));
    };

    let iqr = q3 - q1;
    let bounds = OutlierBounds {
        q1,
        q3,
        iqr,
        lower_fence: q1 - LOWER_FENCE_FACTOR * iqr,
        upper_fence: q3 + UPPER_FENCE_FACTOR * iqr,
    };
    debug!(column, present = sorted.len(), ?bounds, "Outlier fences computed");
    Ok(bounds)
}

fn insufficient(column: &str, found: usize) -> Error {
    Error::InsufficientData {
        column: column.to_string(),
        needed: MIN_PRESENT_VALUES,
        found,
    }
}

/// Splits rows into `(inliers, outliers)` by the fences, inclusive.
///
/// Rows without a value in `column` belong to neither side.
pub fn partition(table: &Table, column: &str, bounds: &OutlierBounds) -> Result<(Table, Table)> {
    let mut inliers = Vec::new();
    let mut outliers = Vec::new();

    for (idx, value) in table.numeric_column(column)?.into_iter().enumerate() {
        match value {
            Some(v) if bounds.contains(v) => inliers.push(idx),
            Some(_) => outliers.push(idx),
            None => {}
        }
    }

    Ok((table.take(&inliers), table.take(&outliers)))
}
