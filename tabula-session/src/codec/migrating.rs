//! Codec that reads the native binary and JSON formats but only writes JSON.

use super::{JsonCodec, NativeBinaryCodec, SessionCodec, SessionValue, looks_legacy};
use crate::error::SessionResult;

/// Upgrade-on-write migration from native binary to JSON.
///
/// Reads pick the decoder from the stored prefix; writes always produce the
/// JSON envelope. A session read in the legacy format is therefore rewritten
/// as JSON by its next save, while sessions that are never saved again stay
/// legacy and keep decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigratingCodec {
    legacy: NativeBinaryCodec,
    current: JsonCodec,
}

impl MigratingCodec {
    /// Create the codec.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `repr` is still in the legacy format.
    pub fn needs_migration(&self, repr: &str) -> bool {
        looks_legacy(repr)
    }
}

impl SessionCodec for MigratingCodec {
    fn encode(&self, value: &SessionValue) -> SessionResult<String> {
        self.current.encode(value)
    }

    fn decode(&self, repr: &str) -> SessionResult<SessionValue> {
        if self.needs_migration(repr) {
            self.legacy.decode(repr)
        } else {
            self.current.decode(repr)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reads_both_formats() {
        let codec = MigratingCodec::new();
        let value = json!({"flag": true, "visits": [1, 2]});

        let legacy = NativeBinaryCodec.encode(&value).unwrap();
        assert_eq!(codec.decode(&legacy).unwrap(), value);

        let current = JsonCodec.encode(&value).unwrap();
        assert_eq!(codec.decode(&current).unwrap(), value);
    }

    #[test]
    fn test_always_writes_json() {
        let codec = MigratingCodec::new();
        for value in [json!({"a": 1}), json!("BAh"), json!([]), json!(null)] {
            let stored = codec.encode(&value).unwrap();
            assert!(!codec.needs_migration(&stored));
            assert_eq!(stored, JsonCodec.encode(&value).unwrap());
        }
    }

    #[test]
    fn test_legacy_read_then_write_upgrades() {
        let codec = MigratingCodec::new();
        let legacy = NativeBinaryCodec.encode(&json!({"flag": true})).unwrap();

        let value = codec.decode(&legacy).unwrap();
        let rewritten = codec.encode(&value).unwrap();

        assert_eq!(rewritten, r#"{"value":{"flag":true}}"#);
        assert_eq!(codec.decode(&rewritten).unwrap(), json!({"flag": true}));
    }

    #[test]
    fn test_corrupt_legacy_is_decode_error() {
        let codec = MigratingCodec::new();
        assert!(codec.decode("BAh@@@").unwrap_err().is_decode_error());
        assert!(codec.decode("{broken").unwrap_err().is_decode_error());
    }
}
