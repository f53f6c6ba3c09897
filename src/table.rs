//! In-memory table of optional string cells.
//!
//! A [`Table`] is built once by the loader and never mutated; projections and
//! filters always produce a new table.

use std::fmt::Display;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A single cell. `None` is an empty field in the source file.
pub type Cell = Option<String>;

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    /// Position of each row in the table it was first built as.
    origin: Vec<usize>,
}

impl Table {
    /// Builds a table, checking that every row has one cell per header.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(Error::Schema {
                column: "*".into(),
                reason: format!(
                    "row {idx} has {} cells, expected {}",
                    row.len(),
                    headers.len()
                ),
            });
        }
        let origin: Vec<usize> = (0..rows.len()).collect();
        Ok(Self {
            headers,
            rows,
            origin,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Position of row `idx` in the source table, surviving filters and partitions.
    pub fn source_row(&self, idx: usize) -> usize {
        self.origin[idx]
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::missing_column(name))
    }

    /// Iterates the cells of one column in row order.
    pub fn column<'a>(&'a self, name: &str) -> Result<impl Iterator<Item = Option<&'a str>> + use<'a>> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    /// Parses one column as numbers, keeping absent cells as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Schema`] if a present cell is not a finite number. The
    /// reported row is the row's position in the source table.
    pub fn numeric_column(&self, name: &str) -> Result<Vec<Option<f64>>> {
        self.column(name)?
            .enumerate()
            .map(|(row, cell)| match cell {
                None => Ok(None),
                Some(raw) => match raw.trim().parse::<f64>() {
                    Ok(v) if v.is_finite() => Ok(Some(v)),
                    _ => Err(Error::not_numeric(name, self.origin[row], raw)),
                },
            })
            .collect()
    }

    /// Parses every present cell of one column with [`FromStr`].
    ///
    /// # Errors
    ///
    /// [`Error::Schema`] naming `name` and the source row of the first cell
    /// that does not parse.
    pub fn parsed_column<T>(&self, name: &str) -> Result<Vec<Option<T>>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.column(name)?
            .enumerate()
            .map(|(row, cell)| {
                cell.map(|raw| {
                    raw.parse::<T>().map_err(|e| Error::Schema {
                        column: name.to_string(),
                        reason: format!("row {}: {e}", self.origin[row]),
                    })
                })
                .transpose()
            })
            .collect()
    }

    /// Keeps only `columns`, in the order given. Row count and order are unchanged.
    pub fn project(&self, columns: &[&str]) -> Result<Table> {
        let indices = columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table {
            headers: columns.iter().map(|c| c.to_string()).collect(),
            rows,
            origin: self.origin.clone(),
        })
    }

    /// Rows whose `column` holds exactly `value`. Absent cells never match.
    pub fn filter_eq(&self, column: &str, value: &str) -> Result<Table> {
        let idx = self.column_index(column)?;
        Ok(self.select(|row| row[idx].as_deref() == Some(value)))
    }

    pub(crate) fn select(&self, keep: impl Fn(&[Cell]) -> bool) -> Table {
        let kept: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| keep(row))
            .map(|(idx, _)| idx)
            .collect();
        self.take(&kept)
    }

    /// Rows at `indices`, in the order given.
    pub(crate) fn take(&self, indices: &[usize]) -> Table {
        Table {
            headers: self.headers.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            origin: indices.iter().map(|&i| self.origin[i]).collect(),
        }
    }
}
