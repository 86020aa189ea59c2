//! JSON codec with a single-key envelope.

use super::{SessionCodec, SessionValue};
use crate::error::SessionResult;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Envelope key under which the session value is stored.
pub const ENVELOPE_KEY: &str = "value";

#[derive(Serialize)]
struct Envelope<'a, T: ?Sized> {
    value: &'a T,
}

/// JSON codec.
///
/// Values are written as `{"value": <value>}` so that scalars, arrays and
/// `null` at the top level survive the trip the same way maps do. Only what
/// JSON can express round-trips: non-finite floats are written as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl JsonCodec {
    /// Encode any serializable value inside the envelope.
    pub fn encode_as<T: Serialize + ?Sized>(&self, value: &T) -> SessionResult<String> {
        Ok(serde_json::to_string(&Envelope { value })?)
    }

    /// Decode and convert into `T`.
    pub fn decode_as<T: DeserializeOwned>(&self, repr: &str) -> SessionResult<T> {
        Ok(serde_json::from_value(self.decode(repr)?)?)
    }
}

impl SessionCodec for JsonCodec {
    fn encode(&self, value: &SessionValue) -> SessionResult<String> {
        self.encode_as(value)
    }

    /// Parse `repr` and unwrap the envelope.
    ///
    /// A top-level object without the envelope key yields `Null`. Anything
    /// that is not an object is returned as parsed; this leniency keeps
    /// hand-written or truncated-envelope rows readable.
    fn decode(&self, repr: &str) -> SessionResult<SessionValue> {
        let parsed: SessionValue = serde_json::from_str(repr)?;
        match parsed {
            SessionValue::Object(mut map) => {
                Ok(map.remove(ENVELOPE_KEY).unwrap_or(SessionValue::Null))
            }
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let stored = JsonCodec.encode(&json!({"user_id": 42})).unwrap();
        assert_eq!(stored, r#"{"value":{"user_id":42}}"#);
        assert!(stored.starts_with('{'));
    }

    #[test]
    fn test_round_trip_top_level_shapes() {
        for value in [
            json!({"a": {"b": [1, 2, {"c": null}]}}),
            json!([1, 2, 3]),
            json!("plain"),
            json!(3.5),
            json!(null),
            json!(false),
        ] {
            let stored = JsonCodec.encode(&value).unwrap();
            assert_eq!(JsonCodec.decode(&stored).unwrap(), value);
        }
    }

    #[test]
    fn test_non_object_passes_through() {
        assert_eq!(JsonCodec.decode("[1,2]").unwrap(), json!([1, 2]));
        assert_eq!(JsonCodec.decode("\"bare\"").unwrap(), json!("bare"));
        assert_eq!(JsonCodec.decode("7").unwrap(), json!(7));
    }

    #[test]
    fn test_object_without_envelope_is_null() {
        assert_eq!(JsonCodec.decode(r#"{"user_id":42}"#).unwrap(), json!(null));
    }

    #[test]
    fn test_envelope_key_is_case_sensitive() {
        assert_eq!(JsonCodec.decode(r#"{"Value":1}"#).unwrap(), json!(null));
        assert_eq!(JsonCodec.decode(r#"{"value":1,"Value":2}"#).unwrap(), json!(1));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        assert!(JsonCodec.decode("{\"value\":").unwrap_err().is_decode_error());
        assert!(JsonCodec.decode("BAhN").unwrap_err().is_decode_error());
    }

    #[test]
    fn test_typed_round_trip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Flash {
            notice: String,
            count: u8,
        }
        let flash = Flash { notice: "saved".into(), count: 2 };
        let stored = JsonCodec.encode_as(&flash).unwrap();
        assert_eq!(stored, r#"{"value":{"notice":"saved","count":2}}"#);
        assert_eq!(JsonCodec.decode_as::<Flash>(&stored).unwrap(), flash);
    }

    #[test]
    fn test_non_finite_float_becomes_null() {
        let stored = JsonCodec.encode_as(&f64::NAN).unwrap();
        assert_eq!(stored, r#"{"value":null}"#);
    }
}
