//! Canonical JSON helpers for fingerprinting.
//!
//! Values pass through `serde_json::Value`, whose maps keep keys sorted, and
//! are written without whitespace, so the same value always hashes to the
//! same BLAKE3 digest regardless of struct field order.

use serde::Serialize;

/// Serialize a value into compact canonical JSON.
pub fn canonical_json_string<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serde_json::to_value(value)?)
}

/// BLAKE3 hex digest of the canonical JSON form of `value`.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = canonical_json_string(value)?;
    Ok(hex::encode(blake3::hash(json.as_bytes()).as_bytes()))
}
