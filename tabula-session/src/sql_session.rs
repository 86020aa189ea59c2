//! Relational session storage on SeaORM.

use crate::codec::{Codec, SessionValue, empty_session};
use crate::config::{SESSION_ID_MAX_LENGTH, SessionConfig};
use crate::error::{SessionError, SessionResult};
use crate::row::SessionRow;
use crate::schema::{SchemaCache, TableSchema, column_from_row, columns_statement};
use crate::traits::SessionStore;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend};
use sea_query::{Alias, ColumnDef, Expr, Index, OnConflict, Query, Table};
use std::sync::Arc;
use tabula_log::{debug, info, trace};

/// Session store backed by a single SQL table.
///
/// Table layout (names configurable through [`SessionConfig`]):
///
/// | column       | type           |                      |
/// |--------------|----------------|----------------------|
/// | `id`         | integer        | primary key          |
/// | `session_id` | `varchar(255)` | unique index         |
/// | `data`       | `text`         | nullable             |
///
/// # Examples
///
/// ```no_run
/// use tabula_session::{CodecKind, SessionConfig, SessionStore, SqlSessionStore};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SessionConfig::new("postgres://localhost/app")
///         .with_codec(CodecKind::Migrating);
///
///     let store = SqlSessionStore::connect(config).await?;
///     store.save("4f1c", &json!({"user_id": 42})).await?;
///
///     let session = store.load("4f1c").await?;
///     assert_eq!(session["user_id"], 42);
///     Ok(())
/// }
/// ```
pub struct SqlSessionStore {
    conn: DatabaseConnection,
    config: SessionConfig,
    codec: Codec,
    schema: SchemaCache,
}

impl SqlSessionStore {
    /// Connect to the configured database.
    pub async fn connect(config: SessionConfig) -> SessionResult<Self> {
        config.validate()?;

        info!("Connecting session store");
        debug!("Session database: {}", config.redacted_url());

        let conn = sea_orm::Database::connect(config.to_connect_options())
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))?;

        info!(
            "Session store ready (table {}, codec {})",
            config.table_name, config.codec
        );

        Ok(Self::with_connection(conn, config))
    }

    /// Use an existing connection.
    ///
    /// The connection is shared, so several stores (for instance with
    /// different codecs) may work on the same pool.
    pub fn with_connection(conn: DatabaseConnection, config: SessionConfig) -> Self {
        let codec = config.codec.codec();
        Self {
            conn,
            config,
            codec,
            schema: SchemaCache::new(),
        }
    }

    /// The store configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The active codec.
    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    /// The underlying connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }

    fn backend(&self) -> DbBackend {
        self.conn.get_database_backend()
    }

    fn table(&self) -> Alias {
        Alias::new(&self.config.table_name)
    }

    fn session_id_column(&self) -> Alias {
        Alias::new(&self.config.session_id_column)
    }

    fn data_column(&self) -> Alias {
        Alias::new(&self.config.data_column)
    }

    // ========== DDL ==========

    /// Create the sessions table and its unique index.
    ///
    /// Clears the schema cache before and after.
    pub async fn create_table(&self) -> SessionResult<()> {
        self.schema.clear().await;
        info!("Creating session table {}", self.config.table_name);

        let create = Table::create()
            .table(self.table())
            .col(
                ColumnDef::new(Alias::new("id"))
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(
                ColumnDef::new(self.session_id_column())
                    .string_len(SESSION_ID_MAX_LENGTH)
                    .not_null(),
            )
            .col(ColumnDef::new(self.data_column()).text().null())
            .to_owned();

        let index = Index::create()
            .name(self.config.index_name())
            .table(self.table())
            .col(self.session_id_column())
            .unique()
            .to_owned();

        let backend = self.backend();
        let result: SessionResult<()> = async {
            self.conn.execute(backend.build(&create)).await?;
            self.conn.execute(backend.build(&index)).await?;
            Ok::<(), SessionError>(())
        }
        .await;

        self.schema.clear().await;
        result
    }

    /// Drop the sessions table.
    ///
    /// Clears the schema cache before and after.
    pub async fn drop_table(&self) -> SessionResult<()> {
        self.schema.clear().await;
        info!("Dropping session table {}", self.config.table_name);

        let drop = Table::drop().table(self.table()).to_owned();
        let result = self
            .conn
            .execute(self.backend().build(&drop))
            .await
            .map(|_| ())
            .map_err(SessionError::from);

        self.schema.clear().await;
        result
    }

    /// Forget cached column metadata, e.g. after altering the table by hand.
    pub async fn reset_schema_cache(&self) {
        self.schema.clear().await;
    }

    /// Column metadata of the sessions table, introspected on first use.
    ///
    /// An empty schema (table missing) is returned but not cached.
    pub async fn table_schema(&self) -> SessionResult<Arc<TableSchema>> {
        if let Some(schema) = self.schema.get().await {
            return Ok(schema);
        }

        let backend = self.backend();
        let rows = self
            .conn
            .query_all(columns_statement(backend, &self.config.table_name))
            .await?;
        let columns = rows
            .iter()
            .map(|row| column_from_row(backend, row))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Introspected {} columns of {}",
            columns.len(),
            self.config.table_name
        );

        let schema = Arc::new(TableSchema::new(columns));
        if !schema.is_empty() {
            self.schema.store(Arc::clone(&schema)).await;
        }
        Ok(schema)
    }

    // ========== Rows ==========

    /// Fetch the raw row for a session.
    pub async fn fetch_row(&self, session_id: &str) -> SessionResult<Option<SessionRow>> {
        let select = Query::select()
            .column(self.session_id_column())
            .column(self.data_column())
            .from(self.table())
            .and_where(Expr::col(self.session_id_column()).eq(session_id))
            .limit(1)
            .to_owned();

        let row = self.conn.query_one(self.backend().build(&select)).await?;
        match row {
            Some(row) => Ok(Some(SessionRow {
                session_id: row.try_get("", &self.config.session_id_column)?,
                data: row.try_get("", &self.config.data_column)?,
            })),
            None => Ok(None),
        }
    }

    /// Check identifier and data size against the live table.
    async fn check_row(&self, row: &SessionRow) -> SessionResult<()> {
        if row.session_id.is_empty() {
            return Err(SessionError::InvalidSessionId("empty session id".into()));
        }

        let schema = self.table_schema().await?;
        if schema.is_empty() {
            // Let the insert report the missing table.
            return Ok(());
        }

        let id_column = schema
            .column(&self.config.session_id_column)
            .ok_or_else(|| SessionError::MissingColumn(self.config.session_id_column.clone()))?;
        let id_limit = id_column
            .max_length
            .unwrap_or(u64::from(SESSION_ID_MAX_LENGTH));
        if row.session_id.chars().count() as u64 > id_limit {
            return Err(SessionError::InvalidSessionId(format!(
                "session id longer than {} characters",
                id_limit
            )));
        }

        let data_column = schema
            .column(&self.config.data_column)
            .ok_or_else(|| SessionError::MissingColumn(self.config.data_column.clone()))?;
        if let Some(limit) = data_column.max_length {
            let size = row.data_chars();
            if size as u64 > limit {
                return Err(SessionError::DataOverflow { size, limit });
            }
        }

        Ok(())
    }

    /// Insert or update a row in one statement.
    pub async fn write_row(&self, row: &SessionRow) -> SessionResult<()> {
        self.check_row(row).await?;

        let upsert = Query::insert()
            .into_table(self.table())
            .columns([self.session_id_column(), self.data_column()])
            .values_panic([row.session_id.clone().into(), row.data.clone().into()])
            .on_conflict(
                OnConflict::column(self.session_id_column())
                    .update_column(self.data_column())
                    .to_owned(),
            )
            .to_owned();

        self.conn.execute(self.backend().build(&upsert)).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn load(&self, session_id: &str) -> SessionResult<SessionValue> {
        let Some(row) = self.fetch_row(session_id).await? else {
            trace!("No stored session for {}", session_id);
            return Ok(empty_session());
        };

        if let Some(repr) = row.data.as_deref() {
            if self.codec.needs_rewrite(repr) {
                debug!(
                    "Session {} is in the legacy format; next save rewrites it as {}",
                    session_id,
                    self.codec.kind()
                );
            }
        }

        row.decode(&self.codec)
    }

    async fn save(&self, session_id: &str, value: &SessionValue) -> SessionResult<()> {
        let row = SessionRow::encode(session_id, value, &self.codec)?;
        self.write_row(&row).await
    }

    async fn destroy(&self, session_id: &str) -> SessionResult<()> {
        let delete = Query::delete()
            .from_table(self.table())
            .and_where(Expr::col(self.session_id_column()).eq(session_id))
            .to_owned();

        let result = self.conn.execute(self.backend().build(&delete)).await?;
        if result.rows_affected() == 0 {
            trace!("Destroy of unknown session {}", session_id);
        }
        Ok(())
    }

    async fn exists(&self, session_id: &str) -> SessionResult<bool> {
        let select = Query::select()
            .column(self.session_id_column())
            .from(self.table())
            .and_where(Expr::col(self.session_id_column()).eq(session_id))
            .limit(1)
            .to_owned();

        Ok(self
            .conn
            .query_one(self.backend().build(&select))
            .await?
            .is_some())
    }

    async fn count(&self) -> SessionResult<usize> {
        let select = Query::select()
            .expr_as(Expr::cust("COUNT(*)"), Alias::new("session_count"))
            .from(self.table())
            .to_owned();

        let count: i64 = match self.conn.query_one(self.backend().build(&select)).await? {
            Some(row) => row.try_get("", "session_count")?,
            None => 0,
        };
        Ok(usize::try_from(count).unwrap_or(0))
    }

    async fn clear(&self) -> SessionResult<()> {
        let delete = Query::delete().from_table(self.table()).to_owned();
        let result = self.conn.execute(self.backend().build(&delete)).await?;
        info!(
            "Cleared {} sessions from {}",
            result.rows_affected(),
            self.config.table_name
        );
        Ok(())
    }
}
