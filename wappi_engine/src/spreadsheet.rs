//! Turns uploaded price-list workbooks into import record data.
//!
//! A sheet is treated as rows of text cells. The first row with more than one non-empty cell is the header row; any
//! rows above it (titles, merged banners) are ignored.
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Reader};
use log::*;
use serde_json::Value;
use thiserror::Error;

use crate::db_types::ImportData;

#[derive(Debug, Clone, Error)]
pub enum SpreadsheetError {
    #[error("Could not open the workbook. {0}")]
    Unreadable(String),
    #[error("Could not read sheet '{0}'. {1}")]
    BadSheet(String, String),
}

/// Reads the first sheet of an xlsx, xls or ods workbook. A workbook without sheets yields no rows.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SpreadsheetError::Unreadable(e.to_string()))?;
    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        info!("📄️ Workbook has no sheets");
        return Ok(Vec::new());
    };
    let range = workbook.worksheet_range(&sheet).map_err(|e| SpreadsheetError::BadSheet(sheet.clone(), e.to_string()))?;
    let rows = range.rows().map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<_>>()).collect::<Vec<_>>();
    debug!("📄️ Read {} rows from sheet '{sheet}'", rows.len());
    Ok(rows)
}

fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// Converts sheet rows into one [`ImportData`] map per non-blank data row.
///
/// Rows are padded to the widest row, blank header cells are named `Col_1`, `Col_2`, … by position, and data rows that
/// are entirely blank are skipped. Sheets with fewer than two rows produce nothing. If no row has more than one
/// non-empty cell, the first row is used as the header.
pub fn rows_to_import_data(mut rows: Vec<Vec<String>>) -> Vec<ImportData> {
    if rows.len() < 2 {
        return Vec::new();
    }
    let width = rows.iter().map(Vec::len).max().unwrap_or_default();
    rows.iter_mut().for_each(|row| row.resize(width, String::new()));
    let header_idx = rows.iter().position(|row| row.iter().filter(|c| !is_blank(c)).count() > 1).unwrap_or_default();
    let headers = rows[header_idx]
        .iter()
        .enumerate()
        .map(|(i, h)| if is_blank(h) { format!("Col_{}", i + 1) } else { h.clone() })
        .collect::<Vec<_>>();
    trace!("📄️ Header row is #{header_idx}: {headers:?}");
    rows.into_iter()
        .skip(header_idx + 1)
        .filter(|row| !row.iter().all(|c| is_blank(c)))
        .map(|row| headers.iter().cloned().zip(row.into_iter().map(Value::String)).collect::<ImportData>())
        .collect()
}
