//! Manifest spreadsheet import
//!
//! The import runs in two steps. [`preview`] reads and validates a workbook
//! without touching the database. The caller shows the resulting
//! [`ImportPreview`] to the operator and, once confirmed, stores
//! [`ImportPreview::shipments`] with [`crate::db::shipments::insert_batch`].
//!
//! Validation is all-or-nothing: one bad cell rejects the whole file.

pub mod columns;
pub mod duplicates;
pub mod spreadsheet;

use crate::bucket::Bucket;
use crate::db::NewShipment;
use crate::{Error, Result};
use columns::{ColumnMap, Field};
use duplicates::{find_duplicates, DuplicateReport};
use serde::Serialize;
use spreadsheet::{whole_number, Cell, Sheet};
use tracing::{debug, info};

/// A parsed data row and where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportRow {
    /// 1-based spreadsheet row number
    pub row_number: usize,
    pub shipment: NewShipment,
}

/// Validated content of a workbook, not yet stored
#[derive(Debug, Clone, Serialize)]
pub struct ImportPreview {
    pub rows: Vec<ImportRow>,
    pub duplicates: DuplicateReport,
}

impl ImportPreview {
    pub fn shipments(&self) -> Vec<NewShipment> {
        self.rows.iter().map(|r| r.shipment.clone()).collect()
    }
}

/// Read, validate and check a workbook for duplicates
pub fn preview(bytes: Vec<u8>) -> Result<ImportPreview> {
    let sheet = spreadsheet::read_workbook(bytes)?;
    preview_sheet(&sheet)
}

pub fn preview_sheet(sheet: &Sheet) -> Result<ImportPreview> {
    let map = ColumnMap::resolve(&sheet.headers)?;
    let rows = parse_rows(sheet, &map)?;
    let duplicates = find_duplicates(&rows);

    info!(
        rows = rows.len(),
        duplicate_seals = duplicates.seals.len(),
        duplicate_permits = duplicates.permits.len(),
        "Import preview ready"
    );

    Ok(ImportPreview { rows, duplicates })
}

/// Convert every non-empty data row into a shipment
pub fn parse_rows(sheet: &Sheet, map: &ColumnMap) -> Result<Vec<ImportRow>> {
    let mut rows = Vec::with_capacity(sheet.rows.len());

    for (index, cells) in sheet.rows.iter().enumerate() {
        if cells.iter().all(Cell::is_empty) {
            continue;
        }

        let row_number = sheet.row_number(index);
        let reader = RowReader {
            cells,
            map,
            row_number,
        };
        rows.push(ImportRow {
            row_number,
            shipment: reader.shipment()?,
        });
    }

    debug!(parsed = rows.len(), total = sheet.rows.len(), "Rows parsed");
    Ok(rows)
}

static EMPTY_CELL: Cell = Cell::Empty;

struct RowReader<'a> {
    cells: &'a [Cell],
    map: &'a ColumnMap,
    row_number: usize,
}

impl RowReader<'_> {
    fn shipment(&self) -> Result<NewShipment> {
        let permit = self
            .text(Field::Permit)?
            .ok_or_else(|| self.invalid(Field::Permit, "permit number is required"))?;

        let mut shipment = NewShipment::new(permit, self.integer(Field::Seal)?);
        for bucket in Bucket::ALL {
            shipment.buckets.set(bucket, self.count(bucket)?);
        }
        shipment.lot = self.integer(Field::Lot)?;
        shipment.origin_owner = self.text(Field::OriginOwner)?;
        shipment.origin_property = self.text(Field::OriginProperty)?;

        Ok(shipment)
    }

    fn cell(&self, field: Field) -> &Cell {
        // Short rows: trailing cells past the last value are empty
        self.cells.get(self.map.index(field)).unwrap_or(&EMPTY_CELL)
    }

    fn invalid(&self, field: Field, message: impl Into<String>) -> Error {
        Error::InvalidRow {
            row: self.row_number,
            column: field.header().to_string(),
            message: message.into(),
        }
    }

    /// Free text, or a whole number rendered as text
    fn text(&self, field: Field) -> Result<Option<String>> {
        match self.cell(field) {
            cell if cell.is_empty() => Ok(None),
            Cell::Float(f) if f.fract() != 0.0 => {
                Err(self.invalid(field, format!("expected text or a whole number, found {}", f)))
            }
            Cell::Bool(b) => Err(self.invalid(field, format!("expected text, found {}", b))),
            cell => Ok(Some(cell.to_text())),
        }
    }

    fn integer(&self, field: Field) -> Result<Option<i64>> {
        match self.cell(field) {
            cell if cell.is_empty() => Ok(None),
            Cell::Int(i) => Ok(Some(*i)),
            Cell::Float(f) => whole_number(*f)
                .map(Some)
                .ok_or_else(|| self.invalid(field, format!("expected a whole number, found {}", f))),
            Cell::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| self.invalid(field, format!("expected a whole number, found '{}'", s.trim()))),
            other => Err(self.invalid(field, format!("expected a whole number, found {}", other.to_text()))),
        }
    }

    fn count(&self, bucket: Bucket) -> Result<i64> {
        let field = Field::Bucket(bucket);
        match self.integer(field)? {
            None => Ok(0),
            Some(n) if n < 0 => Err(self.invalid(field, format!("count cannot be negative ({})", n))),
            Some(n) => Ok(n),
        }
    }
}
