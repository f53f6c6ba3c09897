//! Error taxonomy for the analysis pipeline.

use thiserror::Error;

/// Every failure is terminal for the result being computed.
#[derive(Debug, Error)]
pub enum Error {
    /// The dataset file is missing, unreadable or malformed.
    #[error("failed to load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// An expected column is absent or does not hold the expected kind of value.
    #[error("column '{column}': {reason}")]
    Schema { column: String, reason: String },

    /// Too few present values to compute a statistic.
    #[error("column '{column}' has {found} present values, at least {needed} required")]
    InsufficientData {
        column: String,
        needed: usize,
        found: usize,
    },
}

impl Error {
    pub(crate) fn load(path: &str, reason: impl ToString) -> Self {
        Error::Load {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn missing_column(column: &str) -> Self {
        Error::Schema {
            column: column.to_string(),
            reason: "not present in table".into(),
        }
    }

    pub(crate) fn not_numeric(column: &str, row: usize, value: &str) -> Self {
        Error::Schema {
            column: column.to_string(),
            reason: format!("row {row} holds non-numeric value '{value}'"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
