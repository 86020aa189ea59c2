//! Error types for session operations.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session-specific errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Stored data could not be decoded (bad base64, bad header, bad
    /// MessagePack stream or bad JSON).
    #[error("Decode error: {0}")]
    Decode(String),

    /// A value could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Database error, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),

    /// Connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid session ID
    #[error("Invalid session ID: {0}")]
    InvalidSessionId(String),

    /// Encoded session data does not fit the data column.
    #[error("Session data too large: {size} characters exceeds column limit of {limit}")]
    DataOverflow {
        /// Encoded size in characters
        size: usize,
        /// Column limit reported by the database
        limit: u64,
    },

    /// A configured column is missing from the sessions table.
    #[error("Missing column: {0}")]
    MissingColumn(String),
}

impl SessionError {
    /// Whether this error means the stored session is corrupt rather than
    /// the backend being unavailable.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, SessionError::Decode(_))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() || err.is_syntax() || err.is_eof() {
            SessionError::Decode(err.to_string())
        } else {
            SessionError::Encode(err.to_string())
        }
    }
}

impl From<base64::DecodeError> for SessionError {
    fn from(err: base64::DecodeError) -> Self {
        SessionError::Decode(err.to_string())
    }
}

impl From<rmp_serde::decode::Error> for SessionError {
    fn from(err: rmp_serde::decode::Error) -> Self {
        SessionError::Decode(err.to_string())
    }
}

impl From<rmp_serde::encode::Error> for SessionError {
    fn from(err: rmp_serde::encode::Error) -> Self {
        SessionError::Encode(err.to_string())
    }
}
