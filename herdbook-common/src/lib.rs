//! # Herdbook Common Library
//!
//! Record keeping for cattle shipments: storage of shipment manifests and
//! permit corrections, spreadsheet import, totals per age/sex bucket and the
//! interactive lot builder. The HTTP surface lives in `herdbook-ui`.

pub mod bucket;
pub mod config;
pub mod correction;
pub mod db;
pub mod error;
pub mod import;
pub mod lot;
pub mod totals;

pub use bucket::{Bucket, BucketCounts, Sex};
pub use error::{Error, Result};
