//! Relational session storage for Tabula.
//!
//! Sessions live in one SQL table keyed by session identifier. The data
//! column is written by a configurable [`Codec`]:
//!
//! - `native_binary` - base64-wrapped MessagePack (the default)
//! - `json` - a `{"value": ...}` JSON envelope
//! - `migrating` - reads both of the above, always writes JSON
//! - `passthrough` - stores text untouched
//!
//! # Migrating stored sessions
//!
//! A deployment that has been writing `native_binary` sessions switches to
//! `migrating`. Nothing else is needed: every stored session still loads,
//! and each one is rewritten as JSON the next time it is saved. Once old
//! sessions have expired or been rewritten, switch to `json`.
//!
//! # Features
//!
//! - `sqlx-postgres` - PostgreSQL (enabled by default)
//! - `sqlx-mysql` - MySQL/MariaDB
//! - `sqlx-sqlite` - SQLite
//!
//! # Examples
//!
//! ```no_run
//! use tabula_session::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), SessionError> {
//!     let config = SessionConfig::from_env()?.with_codec(CodecKind::Migrating);
//!     let store = SqlSessionStore::connect(config).await?;
//!
//!     // Deployment tooling, once
//!     store.create_table().await?;
//!
//!     store.save("4f1c", &json!({"user_id": 42})).await?;
//!     let session = store.load("4f1c").await?;
//!     assert_eq!(session["user_id"], 42);
//!
//!     // Unknown ids load as the empty session
//!     assert_eq!(store.load("missing").await?, empty_session());
//!
//!     store.destroy("4f1c").await?;
//!     Ok(())
//! }
//! ```
//!
//! The codecs are usable on their own:
//!
//! ```
//! use tabula_session::codec::{CodecKind, SessionCodec, looks_legacy};
//! use serde_json::json;
//!
//! let legacy = CodecKind::NativeBinary.codec().encode(&json!({"flag": true})).unwrap();
//! assert!(looks_legacy(&legacy));
//!
//! let migrating = CodecKind::Migrating.codec();
//! let value = migrating.decode(&legacy).unwrap();
//! assert_eq!(migrating.encode(&value).unwrap(), r#"{"value":{"flag":true}}"#);
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod row;
pub mod schema;
pub mod sql_session;
pub mod traits;

pub use codec::{Codec, CodecKind, SessionCodec, SessionValue, empty_session};
pub use config::SessionConfig;
pub use error::{SessionError, SessionResult};
pub use row::SessionRow;
pub use schema::{ColumnInfo, SchemaCache, TableSchema};
pub use sql_session::SqlSessionStore;
pub use traits::SessionStore;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::codec::{Codec, CodecKind, SessionCodec, SessionValue, empty_session};
    pub use crate::config::SessionConfig;
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::row::SessionRow;
    pub use crate::sql_session::SqlSessionStore;
    pub use crate::traits::SessionStore;
}
