//! A row of the sessions table.

use crate::codec::{Codec, SessionCodec, SessionValue, empty_session};
use crate::error::SessionResult;
use serde::{Deserialize, Serialize};

/// One stored session: its identifier and the encoded data, `None` when the
/// session value was null at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRow {
    /// Session identifier, unique per table.
    pub session_id: String,
    /// Encoded session value.
    pub data: Option<String>,
}

impl SessionRow {
    /// Build the row to store for `value`. Null values skip encoding.
    pub fn encode(
        session_id: impl Into<String>,
        value: &SessionValue,
        codec: &Codec,
    ) -> SessionResult<Self> {
        let data = if value.is_null() {
            None
        } else {
            Some(codec.encode(value)?)
        };
        Ok(Self {
            session_id: session_id.into(),
            data,
        })
    }

    /// Decode the stored data. A null column, or data that decodes to null,
    /// reads as the empty session.
    pub fn decode(&self, codec: &Codec) -> SessionResult<SessionValue> {
        let value = match self.data.as_deref() {
            Some(repr) => codec.decode(repr)?,
            None => SessionValue::Null,
        };
        Ok(if value.is_null() { empty_session() } else { value })
    }

    /// Encoded size in bytes.
    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, String::len)
    }

    /// Encoded size in characters, the unit of `varchar(n)` limits.
    pub fn data_chars(&self) -> usize {
        self.data.as_deref().map_or(0, |data| data.chars().count())
    }
}
