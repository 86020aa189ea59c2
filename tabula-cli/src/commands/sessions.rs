//! Sessions commands - manage the session table.

use colored::Colorize;
use tabula_session::codec::looks_legacy;
use tabula_session::{CodecKind, SessionConfig, SessionStore, SqlSessionStore};

use crate::error::{CliError, CliResult};
use crate::{info, success, warn};

/// Where the session table lives.
#[derive(Debug, Clone, Default)]
pub struct Target {
    pub database_url: Option<String>,
    pub table: Option<String>,
}

impl Target {
    /// Build the store configuration for this target.
    pub fn config(&self, codec: CodecKind) -> CliResult<SessionConfig> {
        let database_url = self.database_url.clone().ok_or_else(|| {
            CliError::Config("no database URL; pass --database-url or set DATABASE_URL".into())
        })?;

        let mut config = SessionConfig::new(database_url)
            .with_codec(codec)
            .with_max_connections(1);
        if let Some(table) = &self.table {
            config = config.with_table_name(table.clone());
        }
        config.validate()?;
        Ok(config)
    }

    async fn connect(&self, codec: CodecKind) -> CliResult<SqlSessionStore> {
        let config = self.config(codec)?;
        Ok(SqlSessionStore::connect(config).await?)
    }

    /// Configured table name, resolved without touching the database.
    fn table_name(&self) -> CliResult<String> {
        Ok(self.config(CodecKind::default())?.table_name)
    }
}

/// Create the session table.
pub async fn create_table(target: &Target) -> CliResult<()> {
    let store = target.connect(CodecKind::default()).await?;
    let table = store.config().table_name.clone();

    info(&format!("Creating table {}", table.cyan()));
    store.create_table().await?;
    success(&format!("Created table {}", table));
    Ok(())
}

/// Drop the session table.
pub async fn drop_table(target: &Target, force: bool) -> CliResult<()> {
    let table = target.table_name()?;
    if !force {
        warn(&format!("This drops {} and every session in it", table));
        return Err(CliError::NotForced(format!("drop table {}", table)));
    }

    let store = target.connect(CodecKind::default()).await?;
    store.drop_table().await?;
    success(&format!("Dropped table {}", table));
    Ok(())
}

/// Delete every stored session.
pub async fn clear(target: &Target, force: bool) -> CliResult<()> {
    let table = target.table_name()?;
    if !force {
        warn("This signs out every user");
        return Err(CliError::NotForced(format!("clear {}", table)));
    }

    let store = target.connect(CodecKind::default()).await?;
    let before = store.count().await?;
    store.clear().await?;
    success(&format!("Cleared {} sessions from {}", before, table));
    Ok(())
}

/// Print the number of stored sessions.
pub async fn count(target: &Target) -> CliResult<()> {
    let store = target.connect(CodecKind::default()).await?;
    println!("{}", store.count().await?);
    Ok(())
}

/// Load one session and pretty-print it.
pub async fn show(target: &Target, session_id: &str, codec: CodecKind) -> CliResult<()> {
    let store = target.connect(codec).await?;

    let Some(row) = store.fetch_row(session_id).await? else {
        warn(&format!("No session {}", session_id));
        return Ok(());
    };

    let format = match row.data.as_deref() {
        None => "null",
        Some(repr) if looks_legacy(repr) => "native_binary",
        Some(_) => "text",
    };
    info(&format!(
        "Session {} ({} bytes, stored as {}, read with {})",
        session_id.cyan(),
        row.data_len(),
        format,
        codec
    ));

    let value = row.decode(store.codec())?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// List the available codecs.
pub fn codecs() {
    println!();
    println!("  {}", "Session codecs:".bright_white().bold());
    println!();
    for kind in CodecKind::ALL {
        let marker = if kind == CodecKind::default() {
            " (default)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "    {:<16} {}{}",
            kind.as_str().cyan(),
            kind.description(),
            marker
        );
    }
    println!();
}
