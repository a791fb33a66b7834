//! Record store: schema, models and queries

pub mod corrections;
pub mod init;
pub mod models;
pub mod schema_sync;
pub mod shipments;
pub mod table_schemas;

pub use init::{init_database, memory_pool, DATABASE_FILE_NAME};
pub use models::{CorrectionRecord, NewShipment, ShipmentRecord};
pub use table_schemas::create_schema;
