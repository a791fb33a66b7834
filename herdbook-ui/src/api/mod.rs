//! HTTP API handlers for herdbook-ui

pub mod buildinfo;
pub mod corrections;
pub mod export;
pub mod health;
pub mod import;
pub mod lots;
pub mod records;
pub mod ui;

pub use buildinfo::get_build_info;
pub use corrections::{correct_record_permit, list_corrections};
pub use export::export_spreadsheet;
pub use health::health_routes;
pub use import::import_routes;
pub use lots::lot_routes;
pub use records::{delete_all_records, list_record_ids, list_records};
pub use ui::{serve_app_js, serve_index};
