//! Spreadsheet reading
//!
//! Loads the first worksheet of an uploaded workbook into a [`Sheet`]: the
//! header row as text plus typed data cells. Format (xlsx, xls, xlsb, ods)
//! is detected from the file content.

use crate::{Error, Result};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde::Serialize;
use std::io::Cursor;
use tracing::debug;

/// A single data cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// `f` as an integer when it is whole and fits in an `i64`
pub fn whole_number(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, which is already out of range
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Header-style rendering: numbers without a trailing `.0`
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => whole_number(*f).map_or_else(|| f.to_string(), |i| i.to_string()),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<&Data> for Cell {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Int(*i),
            Data::Float(f) => Cell::Float(*f),
            Data::String(s) => Cell::Text(s.clone()),
            Data::Bool(b) => Cell::Bool(*b),
            Data::DateTime(dt) => Cell::Float(dt.as_f64()),
            Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
            Data::Error(e) => Cell::Text(e.to_string()),
        }
    }
}

/// Header row plus data rows of one worksheet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// 1-based spreadsheet row number of the header row
    pub header_row: usize,
}

impl Sheet {
    pub fn from_range(range: &Range<Data>) -> Self {
        let header_row = range.start().map(|(row, _)| row as usize + 1).unwrap_or(1);

        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|cells| cells.iter().map(|c| Cell::from(c).to_text()).collect())
            .unwrap_or_default();

        let rows = rows
            .map(|cells| cells.iter().map(Cell::from).collect())
            .collect();

        Self {
            headers,
            rows,
            header_row,
        }
    }

    /// Spreadsheet row number of the data row at `index`
    pub fn row_number(&self, index: usize) -> usize {
        self.header_row + 1 + index
    }
}

/// Read the first worksheet of a workbook held in memory
pub fn read_workbook(bytes: Vec<u8>) -> Result<Sheet> {
    let size = bytes.len();
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| Error::Spreadsheet(format!("Unreadable workbook: {}", e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| Error::Spreadsheet("Workbook has no worksheets".to_string()))?
        .map_err(|e| Error::Spreadsheet(format!("Unreadable worksheet: {}", e)))?;

    let sheet = Sheet::from_range(&range);
    debug!(bytes = size, columns = sheet.headers.len(), rows = sheet.rows.len(), "Workbook read");

    Ok(sheet)
}
