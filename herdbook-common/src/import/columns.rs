//! Header-to-field mapping for manifest spreadsheets
//!
//! Every field of a shipment row is bound to one exact header text. Header
//! matching ignores surrounding whitespace but is otherwise exact.

use crate::bucket::Bucket;
use crate::{Error, Result};

pub const PERMIT_HEADER: &str = "N.º Série";
pub const SEAL_HEADER: &str = "Lacre";
pub const LOT_HEADER: &str = "Lotes";
pub const OWNER_HEADER: &str = "Proprietário Origem";
pub const PROPERTY_HEADER: &str = "Propriedade Origem";

/// A shipment field fed from one spreadsheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Permit,
    Seal,
    Bucket(Bucket),
    Lot,
    OriginOwner,
    OriginProperty,
}

impl Field {
    /// Every field, in the order of the expected spreadsheet layout
    pub fn all() -> Vec<Field> {
        let mut fields = vec![Field::Permit, Field::Seal];
        fields.extend(Bucket::ALL.iter().map(|&b| Field::Bucket(b)));
        fields.extend([Field::Lot, Field::OriginOwner, Field::OriginProperty]);
        fields
    }

    pub fn header(self) -> &'static str {
        match self {
            Field::Permit => PERMIT_HEADER,
            Field::Seal => SEAL_HEADER,
            Field::Bucket(b) => b.header(),
            Field::Lot => LOT_HEADER,
            Field::OriginOwner => OWNER_HEADER,
            Field::OriginProperty => PROPERTY_HEADER,
        }
    }
}

/// Resolved column index for every field
#[derive(Debug, Clone)]
pub struct ColumnMap {
    indices: Vec<(Field, usize)>,
}

impl ColumnMap {
    /// Locate every expected header
    ///
    /// Fails with [`Error::MissingColumns`] naming all absent headers, in
    /// layout order. When a header repeats, the first occurrence wins.
    pub fn resolve(headers: &[String]) -> Result<Self> {
        let mut indices = Vec::new();
        let mut missing = Vec::new();

        for field in Field::all() {
            match headers.iter().position(|h| h.trim() == field.header()) {
                Some(index) => indices.push((field, index)),
                None => missing.push(field.header().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(Error::MissingColumns(missing));
        }

        Ok(Self { indices })
    }

    pub fn index(&self, field: Field) -> usize {
        self.indices
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, index)| *index)
            .unwrap_or_else(|| unreachable!("ColumnMap is built from Field::all()"))
    }
}
