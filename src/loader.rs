//! Delimited-file loader.

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::config::{Encoding, LoaderConfig};
use crate::error::{Error, Result};
use crate::table::{Cell, Table};

/// Reads a delimited file with a header row into a [`Table`].
///
/// Fields matching one of the configured null values become absent cells.
///
/// # Errors
///
/// Returns [`Error::Load`] if the file cannot be read or decoded, has no
/// header row, or contains a record whose field count differs from the header.
#[tracing::instrument(skip(config))]
pub fn load_table(path: &str, config: &LoaderConfig) -> Result<Table> {
    let bytes = std::fs::read(path).map_err(|e| Error::load(path, e))?;
    debug!(bytes = bytes.len(), "File read, decoding");

    let text = decode(&bytes, config.encoding).map_err(|reason| Error::load(path, reason))?;
    parse(&text, config).map_err(|reason| Error::load(path, reason))
}

fn decode(bytes: &[u8], encoding: Encoding) -> std::result::Result<String, String> {
    match encoding {
        Encoding::Utf8 => {
            let text = std::str::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))?;
            Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
        }
        // Latin-1 code points map one-to-one onto the first 256 Unicode scalars.
        Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn ascii_byte(name: &str, c: char) -> std::result::Result<u8, String> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(format!("{name} '{c}' must be a single ASCII character"))
    }
}

fn parse(text: &str, config: &LoaderConfig) -> std::result::Result<Table, String> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(ascii_byte("delimiter", config.delimiter)?)
        .quote(ascii_byte("quote", config.quote)?)
        .has_headers(true)
        .flexible(false)
        .trim(if config.trim { Trim::All } else { Trim::None })
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() {
        return Err("missing header row".into());
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| e.to_string())?;
        let row: Vec<Cell> = record
            .iter()
            .map(|field| {
                if config.null_values.iter().any(|n| n == field) {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        rows.push(row);
    }

    let table = Table::new(headers, rows).map_err(|e| e.to_string())?;
    info!(
        rows = table.len(),
        columns = table.headers().len(),
        "Table loaded"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_table("/nonexistent/rides.csv", &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn test_empty_and_null_fields_are_absent() {
        let path = temp_path("ride_insights_test_nulls.csv");
        fs::write(&path, "Status,Fare\nCompleted,12.5\nIncomplete,null\nCompleted,\n").unwrap();

        let table = load_table(&path, &LoaderConfig::default()).unwrap();
        let fares: Vec<_> = table.column("Fare").unwrap().collect();
        assert_eq!(fares, vec![Some("12.5"), None, None]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_ragged_record_is_load_error() {
        let path = temp_path("ride_insights_test_ragged.csv");
        fs::write(&path, "Status,Fare\nCompleted,12.5,extra\n").unwrap();

        let err = load_table(&path, &LoaderConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Load { .. }));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_file_is_load_error() {
        let path = temp_path("ride_insights_test_empty.csv");
        fs::write(&path, "").unwrap();

        let err = load_table(&path, &LoaderConfig::default()).unwrap_err();
        assert!(err.to_string().contains("missing header row"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_semicolon_latin1_with_quotes() {
        let path = temp_path("ride_insights_test_latin1.csv");
        // "São Paulo" encoded as Latin-1
        let mut bytes = b"Pickup Location;Fare\n\"S".to_vec();
        bytes.push(0xE3);
        bytes.extend_from_slice(b"o Paulo; Centro\";9\n");
        fs::write(&path, bytes).unwrap();

        let config = LoaderConfig {
            delimiter: ';',
            encoding: Encoding::Latin1,
            ..Default::default()
        };
        let table = load_table(&path, &config).unwrap();
        let locations: Vec<_> = table.column("Pickup Location").unwrap().collect();
        assert_eq!(locations, vec![Some("São Paulo; Centro")]);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let text = decode(b"\xEF\xBB\xBFStatus\n", Encoding::Utf8).unwrap();
        assert_eq!(text, "Status\n");
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        assert!(decode(&[0x53, 0xE3, 0x6F], Encoding::Utf8).is_err());
    }
}
