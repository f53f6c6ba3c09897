use std::collections::HashMap;

use crate::analyzers::types::{CountEntry, FrequencyCount, GroupMean, GroupStat};
use crate::analyzers::utility::MeanAccumulator;
use crate::booking::{BOOKING_STATUS, BookingStatus};
use crate::error::Result;
use crate::table::Table;

/// Counts each distinct value of `column`, absent values included.
///
/// Entries are sorted by descending count; equal counts keep the order in
/// which the values first appear in the table.
pub fn value_counts(table: &Table, column: &str) -> Result<FrequencyCount> {
    Ok(count_values(table.column(column)?))
}

fn count_values<'a>(cells: impl Iterator<Item = Option<&'a str>>) -> FrequencyCount {
    let mut positions: HashMap<Option<&str>, usize> = HashMap::new();
    let mut entries: Vec<CountEntry> = Vec::new();

    for cell in cells {
        let pos = *positions.entry(cell).or_insert_with(|| {
            entries.push(CountEntry {
                value: cell.map(str::to_string),
                count: 0,
            });
            entries.len() - 1
        });
        entries[pos].count += 1;
    }

    // stable: ties stay in first-seen order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    FrequencyCount { entries }
}

/// Value counts of `target_column` over rows where `filter_column == filter_value`,
/// truncated to the `limit` most frequent entries.
///
/// A filter value that never occurs yields an empty result.
pub fn filter_then_count(
    table: &Table,
    filter_column: &str,
    filter_value: &str,
    target_column: &str,
    limit: usize,
) -> Result<Vec<CountEntry>> {
    let filtered = table.filter_eq(filter_column, filter_value)?;
    let mut counts = value_counts(&filtered, target_column)?;
    counts.entries.truncate(limit);
    Ok(counts.entries)
}

/// Rows whose booking status is `Completed`.
pub fn completed(table: &Table) -> Result<Table> {
    table.filter_eq(BOOKING_STATUS, BookingStatus::Completed.label())
}

/// Mean of `value_column` per distinct `group_column` value over completed rides.
///
/// Absent values are skipped. A group with no present value gets an
/// undefined mean rather than zero.
pub fn group_mean(table: &Table, group_column: &str, value_column: &str) -> Result<GroupStat> {
    let completed = completed(table)?;
    let values = completed.numeric_column(value_column)?;

    let mut folds: HashMap<Option<&str>, (MeanAccumulator, usize)> = HashMap::new();
    for (key, value) in completed.column(group_column)?.zip(values) {
        let (acc, rows) = folds.entry(key).or_default();
        *rows += 1;
        if let Some(v) = value {
            acc.push(v);
        }
    }

    let mut groups: Vec<GroupMean> = folds
        .into_iter()
        .map(|(key, (acc, rows))| GroupMean {
            key: key.map(str::to_string),
            mean: acc.mean(),
            present: acc.count(),
            rows,
        })
        .collect();
    groups.sort_by(|a, b| (a.key.is_none(), &a.key).cmp(&(b.key.is_none(), &b.key)));

    Ok(GroupStat { groups })
}
