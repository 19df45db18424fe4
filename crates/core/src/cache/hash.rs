//! Canonical content hashing.
//!
//! Two values that serialize to the same JSON document hash identically no
//! matter in which order their object keys were produced.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::Error;

/// Compute a SHA-256 hex digest over the canonical JSON form of `value`.
///
/// Object keys are sorted recursively before hashing.
///
/// # Errors
///
/// Returns `Error::Decode` if `value` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    let value = serde_json::to_value(value)?;
    let mut hasher = Sha256::new();
    write_canonical(&value, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn write_canonical(value: &Value, hasher: &mut Sha256) -> Result<(), Error> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            hasher.update(b"{");
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                hasher.update(serde_json::to_string(key)?.as_bytes());
                hasher.update(b":");
                write_canonical(item, hasher)?;
            }
            hasher.update(b"}");
        }
        Value::Array(items) => {
            hasher.update(b"[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    hasher.update(b",");
                }
                write_canonical(item, hasher)?;
            }
            hasher.update(b"]");
        }
        scalar => hasher.update(serde_json::to_string(scalar)?.as_bytes()),
    }
    Ok(())
}
