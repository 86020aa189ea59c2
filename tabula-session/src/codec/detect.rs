//! Stored-format sniffing.

/// Prefix of every native binary encoding (base64 of the format header).
///
/// JSON envelopes always begin with `{`, so they never carry it.
pub const LEGACY_SIGNATURE: &str = "BAh";

/// Whether `repr` was produced by the native binary codec.
///
/// A prefix check only; nothing is decoded.
#[inline]
pub fn looks_legacy(repr: &str) -> bool {
    repr.starts_with(LEGACY_SIGNATURE)
}
