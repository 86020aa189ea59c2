//! Native binary codec: MessagePack behind a versioned header, base64-wrapped.

use super::{SessionCodec, SessionValue};
use crate::error::{SessionError, SessionResult};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Header written before every MessagePack payload: format 4.8, tag `M`.
///
/// Base64 of these three bytes is `BAhN`, so every encoded value starts
/// with [`LEGACY_SIGNATURE`](super::LEGACY_SIGNATURE).
pub const NATIVE_HEADER: [u8; 3] = [0x04, 0x08, b'M'];

/// Full-fidelity binary codec.
///
/// Round-trips any [`SessionValue`], and through [`encode_as`](Self::encode_as)
/// / [`decode_as`](Self::decode_as) any serde type. Structs are written as
/// maps so fields can be added without breaking stored sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NativeBinaryCodec;

impl NativeBinaryCodec {
    /// Encode any serializable value.
    pub fn encode_as<T: Serialize + ?Sized>(&self, value: &T) -> SessionResult<String> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&NATIVE_HEADER);
        rmp_serde::encode::write_named(&mut buf, value)?;
        Ok(STANDARD.encode(buf))
    }

    /// Decode into any deserializable type.
    pub fn decode_as<T: DeserializeOwned>(&self, repr: &str) -> SessionResult<T> {
        let bytes = STANDARD.decode(strip_whitespace(repr).as_bytes())?;
        let payload = check_header(&bytes)?;
        Ok(rmp_serde::from_slice(payload)?)
    }
}

/// Line-wrapped base64 is accepted on read.
fn strip_whitespace(repr: &str) -> Cow<'_, str> {
    if repr.bytes().any(|b| b.is_ascii_whitespace()) {
        Cow::Owned(repr.chars().filter(|c| !c.is_ascii_whitespace()).collect())
    } else {
        Cow::Borrowed(repr)
    }
}

fn check_header(bytes: &[u8]) -> SessionResult<&[u8]> {
    if bytes.len() < NATIVE_HEADER.len() {
        return Err(SessionError::Decode("native stream truncated before header".into()));
    }
    let (header, payload) = bytes.split_at(NATIVE_HEADER.len());
    if header[..2] != NATIVE_HEADER[..2] {
        return Err(SessionError::Decode(format!(
            "unsupported native format version {}.{}",
            header[0], header[1]
        )));
    }
    if header[2] != NATIVE_HEADER[2] {
        return Err(SessionError::Decode(format!(
            "unknown native payload tag 0x{:02x}",
            header[2]
        )));
    }
    Ok(payload)
}

impl SessionCodec for NativeBinaryCodec {
    fn encode(&self, value: &SessionValue) -> SessionResult<String> {
        self.encode_as(value)
    }

    fn decode(&self, repr: &str) -> SessionResult<SessionValue> {
        self.decode_as(repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Cart {
        owner: String,
        items: Vec<(u32, f64)>,
        coupon: Option<String>,
    }

    #[test]
    fn test_round_trip_nested_value() {
        let value = json!({
            "user_id": 42,
            "roles": ["admin", "ops"],
            "prefs": {"theme": "dark", "ratio": 0.75, "beta": false},
            "last": null,
            "negative": -17,
        });
        let stored = NativeBinaryCodec.encode(&value).unwrap();
        assert_eq!(NativeBinaryCodec.decode(&stored).unwrap(), value);
    }

    #[test]
    fn test_round_trip_top_level_scalars() {
        for value in [json!(1), json!("text"), json!([1, "two", null]), json!(true)] {
            let stored = NativeBinaryCodec.encode(&value).unwrap();
            assert_eq!(NativeBinaryCodec.decode(&stored).unwrap(), value);
        }
    }

    #[test]
    fn test_round_trip_custom_type() {
        let cart = Cart {
            owner: "ana".into(),
            items: vec![(3, 9.99), (1, 0.5)],
            coupon: None,
        };
        let stored = NativeBinaryCodec.encode_as(&cart).unwrap();
        let back: Cart = NativeBinaryCodec.decode_as(&stored).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_output_starts_with_signature() {
        let stored = NativeBinaryCodec.encode(&json!({"a": 1})).unwrap();
        assert!(stored.starts_with("BAhN"));
        assert_eq!(STANDARD.encode(NATIVE_HEADER), "BAhN");
    }

    #[test]
    fn test_accepts_line_wrapped_input() {
        let value = json!({"long": "x".repeat(200)});
        let stored = NativeBinaryCodec.encode(&value).unwrap();
        let wrapped: String = stored
            .as_bytes()
            .chunks(60)
            .map(|chunk| format!("{}\n", std::str::from_utf8(chunk).unwrap()))
            .collect();
        assert_eq!(NativeBinaryCodec.decode(&wrapped).unwrap(), value);
    }

    #[test]
    fn test_rejects_invalid_base64() {
        let err = NativeBinaryCodec.decode("BAh!!not base64").unwrap_err();
        assert!(err.is_decode_error());
    }

    #[test]
    fn test_rejects_foreign_header() {
        let foreign = STANDARD.encode([0x04, 0x09, b'M', 0x80]);
        assert!(NativeBinaryCodec.decode(&foreign).unwrap_err().is_decode_error());

        let tagged = STANDARD.encode([0x04, 0x08, b'X', 0x80]);
        assert!(NativeBinaryCodec.decode(&tagged).unwrap_err().is_decode_error());

        let short = STANDARD.encode([0x04]);
        assert!(NativeBinaryCodec.decode(&short).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_rejects_corrupt_payload() {
        let mut bytes = NATIVE_HEADER.to_vec();
        // map of 2 entries, then nothing
        bytes.push(0x82);
        let corrupt = STANDARD.encode(bytes);
        assert!(NativeBinaryCodec.decode(&corrupt).unwrap_err().is_decode_error());
    }
}
