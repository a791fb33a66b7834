//! Declarative table schemas and column synchronization
//!
//! Each table is described once in code ([`TableSchema`]). On startup the
//! description is used twice:
//! 1. `CREATE TABLE IF NOT EXISTS` built from the column list
//! 2. Auto-sync: any expected column missing from an existing table is added
//!    with `ALTER TABLE ADD COLUMN`
//!
//! Older `bovinos` files were created before the origin owner/property
//! columns existed; step 2 brings them up to date without touching data.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Column definition with SQL constraints
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// SQL type (e.g., "TEXT", "INTEGER")
    pub sql_type: String,
    pub not_null: bool,
    pub primary_key: bool,
    pub autoincrement: bool,
    pub default_value: Option<String>,
    /// `table(column)` target of a REFERENCES clause
    pub references: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            autoincrement: false,
            default_value: None,
            references: None,
        }
    }

    /// INTEGER PRIMARY KEY AUTOINCREMENT
    pub fn auto_id(mut self) -> Self {
        self.primary_key = true;
        self.autoincrement = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn references(mut self, target: impl Into<String>) -> Self {
        self.references = Some(target.into());
        self
    }

    /// Column clause as used inside CREATE TABLE
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
            if self.autoincrement {
                sql.push_str(" AUTOINCREMENT");
            }
        }
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(&format!(" DEFAULT {}", default));
        }
        if let Some(target) = &self.references {
            sql.push_str(&format!(" REFERENCES {}", target));
        }
        sql
    }
}

/// Column as reported by PRAGMA table_info
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub not_null: bool,
    pub pk: bool,
}

/// Difference between expected and actual schema
#[derive(Debug, Clone)]
pub enum SchemaDrift {
    /// Column missing from database
    MissingColumn {
        table: String,
        column: ColumnDefinition,
    },
    /// Column type mismatch (cannot auto-fix)
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
}

/// Expected schema of one table
pub trait TableSchema {
    fn table_name() -> &'static str;

    /// Expected column definitions, in creation order
    fn expected_columns() -> Vec<ColumnDefinition>;

    /// `CREATE TABLE IF NOT EXISTS` statement for the expected columns
    fn create_sql() -> String {
        let columns: Vec<String> = Self::expected_columns()
            .iter()
            .map(|c| format!("    {}", c.to_sql()))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
            Self::table_name(),
            columns.join(",\n")
        )
    }
}

/// Read the actual schema of a table
pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Columns in database order (by cid)
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns: Vec<ActualColumn> = rows
            .iter()
            .map(|row| ActualColumn {
                cid: row.get("cid"),
                name: row.get("name"),
                type_name: row.get("type"),
                not_null: row.get::<i32, _>("notnull") != 0,
                pk: row.get::<i32, _>("pk") != 0,
            })
            .collect();

        columns.sort_by_key(|c| c.cid);

        Ok(columns)
    }

    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type='table' AND name = ?
            )
            "#,
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

/// Compare expected and actual columns
pub struct SchemaDiff;

impl SchemaDiff {
    pub fn compare(table_name: &str, expected: &[ColumnDefinition], actual: &[ActualColumn]) -> Vec<SchemaDrift> {
        let mut drift = Vec::new();

        for expected_col in expected {
            match actual.iter().find(|c| c.name.eq_ignore_ascii_case(&expected_col.name)) {
                Some(actual_col) => {
                    if !Self::types_compatible(&expected_col.sql_type, &actual_col.type_name) {
                        drift.push(SchemaDrift::TypeMismatch {
                            table: table_name.to_string(),
                            column: expected_col.name.clone(),
                            expected: expected_col.sql_type.clone(),
                            actual: actual_col.type_name.clone(),
                        });
                    }
                }
                None => drift.push(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: expected_col.clone(),
                }),
            }
        }

        drift
    }

    /// SQLite type affinity comparison
    fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        if exp.contains("INT") && act.contains("INT") {
            return true;
        }

        let texty = |t: &str| t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB");
        texty(&exp) && texty(&act)
    }
}

/// Apply schema definitions to the database
pub struct SchemaSync;

impl SchemaSync {
    /// Create the table if absent, then add any missing columns
    ///
    /// Type mismatches are logged and left alone.
    pub async fn ensure_table<T: TableSchema>(pool: &SqlitePool) -> Result<()> {
        let table_name = T::table_name();

        sqlx::query(&T::create_sql()).execute(pool).await?;

        let expected = T::expected_columns();
        let actual = SchemaIntrospector::introspect_table(pool, table_name).await?;
        let drift = SchemaDiff::compare(table_name, &expected, &actual);

        if drift.is_empty() {
            debug!(table = table_name, "Schema up to date");
            return Ok(());
        }

        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                }
                SchemaDrift::TypeMismatch { table, column, expected, actual } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'. Left unchanged.",
                        table, column, expected, actual
                    );
                }
            }
        }

        Ok(())
    }

    /// Add missing column via ALTER TABLE ADD COLUMN
    async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
        let mut sql = format!("ALTER TABLE {} ADD COLUMN {} {}", table, column.name, column.sql_type);

        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{} via ALTER TABLE; adding it as a plain column",
                table, column.name
            );
        }

        // SQLite only accepts NOT NULL on added columns when a DEFAULT is given
        match (&column.default_value, column.not_null) {
            (Some(default), true) => sql.push_str(&format!(" NOT NULL DEFAULT {}", default)),
            (Some(default), false) => sql.push_str(&format!(" DEFAULT {}", default)),
            (None, true) => warn!(
                "Cannot add NOT NULL column {}.{} without DEFAULT; column will be nullable",
                table, column.name
            ),
            (None, false) => {}
        }

        info!("Adding column {}.{} ({})", table, column.name, column.sql_type);

        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                info!("Column {}.{} already present", table, column.name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
