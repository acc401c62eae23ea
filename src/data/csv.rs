//! CSV dataset reader.
//!
//! Maps named header columns onto [`RawRow`] fields and drops rows that do
//! not describe a person (the `org` sentinel in the laureate data) before
//! they reach the entity store.

use csv::{ReaderBuilder, StringRecord, Trim};

use super::RawRow;
use crate::error::DataFormatError;

/// Which header columns feed which entity fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetColumns {
    pub id: String,
    pub category: String,
    pub secondary: String,
    /// Rows whose secondary value equals this are excluded
    pub exclude_secondary: Option<String>,
}

impl Default for DatasetColumns {
    fn default() -> Self {
        Self {
            id: "id".to_string(),
            category: "Category".to_string(),
            secondary: "Gender".to_string(),
            exclude_secondary: Some("org".to_string()),
        }
    }
}

/// Rows kept for the store, plus how many were filtered out.
#[derive(Debug, Clone, Default)]
pub struct ParsedRows {
    pub rows: Vec<RawRow>,
    pub excluded: usize,
}

fn column_index(headers: &StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

/// Parse CSV text with a header line.
///
/// A column missing from the header leaves the field empty, so the store
/// reports it against the first row.
pub fn parse_rows(text: &str, columns: &DatasetColumns) -> Result<ParsedRows, DataFormatError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| DataFormatError::new(0, format!("unreadable header: {}", e)))?
        .clone();

    let id_col = column_index(&headers, &columns.id);
    let category_col = column_index(&headers, &columns.category);
    let secondary_col = column_index(&headers, &columns.secondary);
    for (name, col) in [
        (&columns.id, id_col),
        (&columns.category, category_col),
        (&columns.secondary, secondary_col),
    ] {
        if col.is_none() {
            log::warn!("Dataset has no {:?} column", name);
        }
    }

    let field = |record: &StringRecord, col: Option<usize>| {
        col.and_then(|c| record.get(c)).map(|s| s.to_string())
    };

    let mut parsed = ParsedRows::default();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| DataFormatError::new(index + 1, e.to_string()))?;
        let row = RawRow {
            id: field(&record, id_col),
            category: field(&record, category_col),
            secondary: field(&record, secondary_col),
        };

        let excluded = match (&columns.exclude_secondary, &row.secondary) {
            (Some(sentinel), Some(value)) => sentinel == value,
            _ => false,
        };
        if excluded {
            parsed.excluded += 1;
        } else {
            parsed.rows.push(row);
        }
    }

    log::debug!(
        "Parsed {} rows ({} excluded as {:?})",
        parsed.rows.len(),
        parsed.excluded,
        columns.exclude_secondary
    );
    Ok(parsed)
}
