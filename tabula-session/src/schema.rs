//! Column introspection for the sessions table, cached per store.
//!
//! The store asks the database for the table's columns the first time it
//! needs them (identifier length, data column capacity) and keeps the answer
//! until DDL runs or the cache is reset explicitly.

use sea_orm::{DbBackend, DbErr, QueryResult, Statement};
use std::sync::Arc;
use tokio::sync::RwLock;

/// One column as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared type, as the database spells it
    pub declared_type: String,
    /// Maximum length in characters, when the type has one
    pub max_length: Option<u64>,
    /// Whether the column accepts NULL
    pub nullable: bool,
}

/// Columns of the sessions table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Wrap introspected columns.
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// All columns in table order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// No columns means the table does not exist.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Cached [`TableSchema`].
#[derive(Debug, Default)]
pub struct SchemaCache {
    entry: RwLock<Option<Arc<TableSchema>>>,
}

impl SchemaCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached schema, if any.
    pub async fn get(&self) -> Option<Arc<TableSchema>> {
        self.entry.read().await.clone()
    }

    /// Replace the cached schema.
    pub async fn store(&self, schema: Arc<TableSchema>) {
        *self.entry.write().await = Some(schema);
    }

    /// Forget the cached schema.
    pub async fn clear(&self) {
        self.entry.write().await.take();
    }
}

/// Statement listing the columns of `table` on `backend`.
///
/// Every variant yields `name`, `declared_type`, `max_length` and `nullable`
/// except SQLite, whose pragma reports `not_null` and no lengths.
pub(crate) fn columns_statement(backend: DbBackend, table: &str) -> Statement {
    let sql = match backend {
        DbBackend::Postgres => {
            "SELECT column_name::text AS name, data_type::text AS declared_type, \
             character_maximum_length::bigint AS max_length, is_nullable::text AS nullable \
             FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position"
        }
        DbBackend::MySql => {
            "SELECT column_name AS name, data_type AS declared_type, \
             CAST(character_maximum_length AS SIGNED) AS max_length, is_nullable AS nullable \
             FROM information_schema.columns \
             WHERE table_schema = DATABASE() AND table_name = ? \
             ORDER BY ordinal_position"
        }
        DbBackend::Sqlite => {
            "SELECT name, type AS declared_type, \"notnull\" AS not_null \
             FROM pragma_table_info(?) ORDER BY cid"
        }
    };
    Statement::from_sql_and_values(backend, sql, [table.into()])
}

/// Read one row produced by [`columns_statement`].
pub(crate) fn column_from_row(backend: DbBackend, row: &QueryResult) -> Result<ColumnInfo, DbErr> {
    let name: String = row.try_get("", "name")?;
    let declared_type: String = row.try_get("", "declared_type")?;

    let (max_length, nullable) = match backend {
        DbBackend::Sqlite => {
            let not_null: i64 = row.try_get("", "not_null")?;
            (parse_declared_length(&declared_type), not_null == 0)
        }
        DbBackend::Postgres | DbBackend::MySql => {
            let max_length: Option<i64> = row.try_get("", "max_length")?;
            let nullable: String = row.try_get("", "nullable")?;
            (
                max_length.and_then(|n| u64::try_from(n).ok()),
                nullable.eq_ignore_ascii_case("YES"),
            )
        }
    };

    Ok(ColumnInfo {
        name,
        declared_type,
        max_length,
        nullable,
    })
}

/// Length from a declared type such as `varchar(255)`.
///
/// Only the first parenthesised number counts: `decimal(10,2)` gives 10.
pub fn parse_declared_length(declared: &str) -> Option<u64> {
    let open = declared.find('(')?;
    let rest = &declared[open + 1..];
    let close = rest.find([')', ','])?;
    rest[..close].trim().parse().ok()
}
