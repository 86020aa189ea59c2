//! Serialization strategies for the session data column.
//!
//! A [`Codec`] turns a [`SessionValue`] into the text stored in the data
//! column and back. Exactly one codec is active per store, selected by
//! [`CodecKind`] in the store configuration:
//!
//! | kind            | writes              | reads                         |
//! |-----------------|---------------------|-------------------------------|
//! | `native_binary` | base64 MessagePack  | base64 MessagePack            |
//! | `json`          | `{"value": ...}`    | JSON                          |
//! | `migrating`     | `{"value": ...}`    | base64 MessagePack or JSON    |
//! | `passthrough`   | the value's text    | the stored text               |
//!
//! Switching a live deployment from `native_binary` to `migrating` keeps
//! every stored session readable and rewrites each one as JSON the next time
//! it is saved.

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod detect;
pub mod json;
pub mod migrating;
pub mod native;
pub mod passthrough;

pub use detect::{LEGACY_SIGNATURE, looks_legacy};
pub use json::JsonCodec;
pub use migrating::MigratingCodec;
pub use native::{NATIVE_HEADER, NativeBinaryCodec};
pub use passthrough::PassThroughCodec;

/// Application session state. `Null` is the absent value.
pub type SessionValue = serde_json::Value;

/// The value handed out for missing or empty sessions.
pub fn empty_session() -> SessionValue {
    SessionValue::Object(serde_json::Map::new())
}

/// Conversion between session values and their stored text form.
pub trait SessionCodec: Send + Sync {
    /// Encode a value for storage.
    fn encode(&self, value: &SessionValue) -> SessionResult<String>;

    /// Decode a stored representation.
    fn decode(&self, repr: &str) -> SessionResult<SessionValue>;
}

/// Codec selector used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CodecKind {
    /// Base64-wrapped MessagePack. The default when nothing is configured.
    #[default]
    #[serde(rename = "native_binary")]
    NativeBinary,
    /// JSON envelope.
    #[serde(rename = "json")]
    Json,
    /// Reads native binary or JSON, writes JSON.
    #[serde(rename = "migrating")]
    Migrating,
    /// Stores text untouched.
    #[serde(rename = "passthrough", alias = "pass_through")]
    PassThrough,
}

impl CodecKind {
    /// Every kind, in configuration order.
    pub const ALL: [CodecKind; 4] = [
        CodecKind::NativeBinary,
        CodecKind::Json,
        CodecKind::Migrating,
        CodecKind::PassThrough,
    ];

    /// Configuration name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            CodecKind::NativeBinary => "native_binary",
            CodecKind::Json => "json",
            CodecKind::Migrating => "migrating",
            CodecKind::PassThrough => "passthrough",
        }
    }

    /// Short human description, used by tooling.
    pub fn description(&self) -> &'static str {
        match self {
            CodecKind::NativeBinary => "base64-encoded MessagePack (legacy default)",
            CodecKind::Json => "JSON envelope {\"value\": ...}",
            CodecKind::Migrating => "reads native binary and JSON, always writes JSON",
            CodecKind::PassThrough => "stores text as-is, serialization left to the database",
        }
    }

    /// Build the codec for this kind.
    pub fn codec(self) -> Codec {
        Codec::from(self)
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodecKind {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "native_binary" => Ok(CodecKind::NativeBinary),
            "json" => Ok(CodecKind::Json),
            "migrating" => Ok(CodecKind::Migrating),
            "passthrough" | "pass_through" => Ok(CodecKind::PassThrough),
            other => Err(SessionError::Config(format!(
                "unknown session codec '{}', expected one of native_binary, json, migrating, passthrough",
                other
            ))),
        }
    }
}

/// The active codec. A closed set: adding a kind means adding a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// See [`NativeBinaryCodec`]
    NativeBinary(NativeBinaryCodec),
    /// See [`JsonCodec`]
    Json(JsonCodec),
    /// See [`MigratingCodec`]
    Migrating(MigratingCodec),
    /// See [`PassThroughCodec`]
    PassThrough(PassThroughCodec),
}

impl Codec {
    /// The configuration kind this codec was built from.
    pub fn kind(&self) -> CodecKind {
        match self {
            Codec::NativeBinary(_) => CodecKind::NativeBinary,
            Codec::Json(_) => CodecKind::Json,
            Codec::Migrating(_) => CodecKind::Migrating,
            Codec::PassThrough(_) => CodecKind::PassThrough,
        }
    }

    /// Whether `repr` is in a format this codec would not write itself.
    ///
    /// Only the migrating codec reads a format it does not write.
    pub fn needs_rewrite(&self, repr: &str) -> bool {
        match self {
            Codec::Migrating(codec) => codec.needs_migration(repr),
            _ => false,
        }
    }
}

impl Default for Codec {
    fn default() -> Self {
        CodecKind::default().codec()
    }
}

impl From<CodecKind> for Codec {
    fn from(kind: CodecKind) -> Self {
        match kind {
            CodecKind::NativeBinary => Codec::NativeBinary(NativeBinaryCodec),
            CodecKind::Json => Codec::Json(JsonCodec),
            CodecKind::Migrating => Codec::Migrating(MigratingCodec::default()),
            CodecKind::PassThrough => Codec::PassThrough(PassThroughCodec),
        }
    }
}

impl SessionCodec for Codec {
    fn encode(&self, value: &SessionValue) -> SessionResult<String> {
        match self {
            Codec::NativeBinary(codec) => codec.encode(value),
            Codec::Json(codec) => codec.encode(value),
            Codec::Migrating(codec) => codec.encode(value),
            Codec::PassThrough(codec) => codec.encode(value),
        }
    }

    fn decode(&self, repr: &str) -> SessionResult<SessionValue> {
        match self {
            Codec::NativeBinary(codec) => codec.decode(repr),
            Codec::Json(codec) => codec.decode(repr),
            Codec::Migrating(codec) => codec.decode(repr),
            Codec::PassThrough(codec) => codec.decode(repr),
        }
    }
}
