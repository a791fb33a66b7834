//! Table schema definitions
//!
//! Single source of truth for the two persisted tables. Column names are kept
//! as they appear in existing record files so those files open as-is.

use crate::bucket::Bucket;
use crate::db::schema_sync::{ColumnDefinition, SchemaSync, TableSchema};
use crate::Result;
use sqlx::SqlitePool;
use tracing::info;

/// Shipment manifests, one row per spreadsheet line
pub struct ShipmentsTableSchema;

impl TableSchema for ShipmentsTableSchema {
    fn table_name() -> &'static str {
        "bovinos"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        let mut columns = vec![
            ColumnDefinition::new("id", "INTEGER").auto_id(),
            ColumnDefinition::new("numero_gta", "TEXT").not_null(),
            ColumnDefinition::new("lacre", "INTEGER"),
        ];

        columns.extend(
            Bucket::ALL
                .iter()
                .map(|b| ColumnDefinition::new(b.column(), "INTEGER")),
        );

        columns.push(ColumnDefinition::new("lote", "INTEGER"));
        // Added after the first revision; synced onto older files
        columns.push(ColumnDefinition::new("proprietario_origem", "TEXT"));
        columns.push(ColumnDefinition::new("propriedade_origem", "TEXT"));

        columns
    }
}

/// Append-only permit correction history
pub struct CorrectionsTableSchema;

impl TableSchema for CorrectionsTableSchema {
    fn table_name() -> &'static str {
        "correcoes_gta"
    }

    fn expected_columns() -> Vec<ColumnDefinition> {
        vec![
            ColumnDefinition::new("id", "INTEGER").auto_id(),
            ColumnDefinition::new("bovino_id", "INTEGER")
                .not_null()
                .references("bovinos(id)"),
            ColumnDefinition::new("gta_original", "TEXT").not_null(),
            ColumnDefinition::new("gta_corrigida", "TEXT").not_null(),
            ColumnDefinition::new("motivo", "TEXT"),
            ColumnDefinition::new("data_correcao", "TEXT").not_null(),
        ]
    }
}

/// Create both tables if absent and bring their columns up to date
///
/// Safe to call any number of times.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    SchemaSync::ensure_table::<ShipmentsTableSchema>(pool).await?;
    SchemaSync::ensure_table::<CorrectionsTableSchema>(pool).await?;

    info!("Schema ready");
    Ok(())
}
