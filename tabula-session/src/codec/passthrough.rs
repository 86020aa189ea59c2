//! Identity codec for databases that serialize on their own.

use super::{SessionCodec, SessionValue};
use crate::error::SessionResult;

/// Leaves serialization to the database adapter.
///
/// Text values are stored verbatim and read back as text. Any other value
/// reaches the text column in its canonical JSON form, which is what the
/// adapter would write for it; reading that row returns the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassThroughCodec;

impl SessionCodec for PassThroughCodec {
    fn encode(&self, value: &SessionValue) -> SessionResult<String> {
        Ok(match value {
            SessionValue::String(text) => text.clone(),
            other => other.to_string(),
        })
    }

    fn decode(&self, repr: &str) -> SessionResult<SessionValue> {
        Ok(SessionValue::String(repr.to_owned()))
    }
}
