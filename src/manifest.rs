//! Manifest reading and writing.
//!
//! A manifest is `id,source` per line under a one-line header. There is no
//! quoting: a field that would need a comma is refused on both the read and
//! the write side instead of being split in the wrong place.

use crate::constants::{
    MANIFEST_DELIMITER, OUTPUT_MANIFEST_HEADER, SPREADSHEET_ID_COLUMN, SPREADSHEET_URL_COLUMN,
};
use crate::error::{ManifestError, Result, StorageError};
use crate::formats::ManifestKind;
use crate::storage::{unique_file_name, write_file};
use crate::types::{CompressionOutcome, ImageRecord};
use crate::validation::extract_extension;
use calamine::{open_workbook_auto, Data, Reader};
use std::fs;
use std::path::{Path, PathBuf};

/// Parse a manifest file, choosing the reader by extension.
///
/// Anything that is not `csv` is handed to the spreadsheet reader.
pub fn parse_manifest(path: &Path) -> std::result::Result<Vec<ImageRecord>, ManifestError> {
    let kind = path
        .to_str()
        .and_then(extract_extension)
        .and_then(ManifestKind::from_extension)
        .unwrap_or(ManifestKind::Spreadsheet);

    let records = match kind {
        ManifestKind::Csv => parse_csv_file(path)?,
        ManifestKind::Spreadsheet => parse_spreadsheet(path)?,
    };
    log::debug!("Parsed {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn parse_csv_file(path: &Path) -> std::result::Result<Vec<ImageRecord>, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(&content)
}

/// Parse CSV manifest text. Line 1 is a header and is skipped whatever it says.
///
/// Every later line must be a row; a blank line is malformed.
pub fn parse_csv(content: &str) -> std::result::Result<Vec<ImageRecord>, ManifestError> {
    let mut records = Vec::new();

    for (index, line) in content.lines().enumerate().skip(1) {
        let line_number = index + 1;
        let fields: Vec<&str> = line.split(MANIFEST_DELIMITER).collect();
        match fields.len() {
            2 => {}
            0 | 1 => {
                return Err(ManifestError::MalformedRow {
                    line: line_number,
                    content: line.to_string(),
                })
            }
            _ => return Err(ManifestError::EmbeddedComma { line: line_number }),
        }

        let id = fields[0]
            .trim()
            .parse::<i64>()
            .map_err(|_| ManifestError::InvalidId {
                line: line_number,
                value: fields[0].to_string(),
            })?;

        records.push(ImageRecord::new(id, fields[1]));
    }

    Ok(records)
}

/// Read the first worksheet, mapping the `ImageId` and `ImageURL` columns by header name.
pub fn parse_spreadsheet(path: &Path) -> std::result::Result<Vec<ImageRecord>, ManifestError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ManifestError::Spreadsheet(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ManifestError::Spreadsheet("workbook has no worksheets".to_string()))?
        .map_err(|e| ManifestError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or(ManifestError::MissingColumn(SPREADSHEET_ID_COLUMN))?;
    let id_column = find_column(header, SPREADSHEET_ID_COLUMN)?;
    let url_column = find_column(header, SPREADSHEET_URL_COLUMN)?;

    let mut records = Vec::new();
    for (offset, row) in rows.enumerate() {
        let line_number = offset + 2;
        let id_cell = row.get(id_column).unwrap_or(&Data::Empty);
        let url_cell = row.get(url_column).unwrap_or(&Data::Empty);

        if matches!(id_cell, Data::Empty) && matches!(url_cell, Data::Empty) {
            continue;
        }

        let id = cell_to_id(id_cell).ok_or_else(|| ManifestError::InvalidId {
            line: line_number,
            value: cell_to_text(id_cell),
        })?;
        records.push(ImageRecord::new(id, cell_to_text(url_cell)));
    }

    Ok(records)
}

fn find_column(header: &[Data], name: &'static str) -> std::result::Result<usize, ManifestError> {
    header
        .iter()
        .position(|cell| cell_to_text(cell).trim() == name)
        .ok_or(ManifestError::MissingColumn(name))
}

fn cell_to_id(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(value) => Some(*value),
        Data::Float(value) if value.fract() == 0.0 => Some(*value as i64),
        Data::String(value) => value.trim().parse().ok(),
        _ => None,
    }
}

fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::String(value) => value.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Persist an uploaded CSV manifest under a stamp-derived name and return its path.
pub fn store_uploaded_manifest(
    bytes: &[u8],
    upload_dir: &Path,
) -> std::result::Result<PathBuf, StorageError> {
    write_file(upload_dir, &unique_file_name("csv"), bytes)
}

/// Render outcomes as result-manifest text.
///
/// Failed outcomes keep their row, with the reason in the location column.
pub fn render_manifest(
    outcomes: &[CompressionOutcome],
) -> std::result::Result<String, ManifestError> {
    let mut content = String::new();
    content.push_str(OUTPUT_MANIFEST_HEADER);
    content.push('\n');

    for outcome in outcomes {
        let value = match outcome {
            CompressionOutcome::Ok(record) if !is_single_field(&record.source) => {
                return Err(ManifestError::UnwritableField {
                    id: record.id,
                    value: record.source.clone(),
                });
            }
            CompressionOutcome::Ok(record) => record.source.clone(),
            // Reasons are diagnostics, not data; keep them on one field of one line.
            CompressionOutcome::Failed { reason, .. } => reason
                .replace(MANIFEST_DELIMITER, ";")
                .replace(['\r', '\n'], " "),
        };
        content.push_str(&format!("{}{}{}\n", outcome.id(), MANIFEST_DELIMITER, value));
    }

    Ok(content)
}

fn is_single_field(value: &str) -> bool {
    !value.contains([MANIFEST_DELIMITER, '\r', '\n'])
}

/// Write a result manifest into `destination` and return its generated file name.
pub fn write_manifest(outcomes: &[CompressionOutcome], destination: &Path) -> Result<String> {
    let content = render_manifest(outcomes)?;
    let file_name = unique_file_name("csv");
    write_file(destination, &file_name, content.as_bytes())?;
    log::debug!("Wrote result manifest {} ({} rows)", file_name, outcomes.len());
    Ok(file_name)
}
