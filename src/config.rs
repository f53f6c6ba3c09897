//! Analysis settings.
//!
//! Stored as a JSON object on disk; every field is optional:
//! ```json
//! {
//!   "loader": { "delimiter": ";", "encoding": "latin-1" },
//!   "questions": { "top_locations": 5 }
//! }
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::booking::BOOKING_VALUE;

/// Text encoding of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
}

/// Strings treated as an empty field, matching what pandas reads as NA.
pub const DEFAULT_NULL_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None",
    "n/a", "nan", "null",
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub delimiter: char,
    pub quote: char,
    pub encoding: Encoding,
    pub trim: bool,
    pub null_values: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            encoding: Encoding::Utf8,
            trim: true,
            null_values: DEFAULT_NULL_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Parameters of the fixed business questions.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuestionConfig {
    /// Driver cancellation reason whose pickup locations are ranked.
    pub overcrowding_reason: String,
    pub top_locations: usize,
    /// Numeric column the outlier fences are computed on.
    pub fare_column: String,
}

impl Default for QuestionConfig {
    fn default() -> Self {
        Self {
            overcrowding_reason: "More than permitted people in there".into(),
            top_locations: 3,
            fare_column: BOOKING_VALUE.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub loader: LoaderConfig,
    pub questions: QuestionConfig,
}

impl AnalysisConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading config '{path}'"))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("parsing config '{path}'"))?;
        Ok(config)
    }
}
