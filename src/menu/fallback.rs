//! Static JSON fallback for the no-database deployment mode.

use std::fs;
use std::path::Path;

use serde_json::Value;

/// Load the fallback menu file, if present and well-formed.
///
/// Accepts either a top-level array of items or an object with an `items`
/// array. The content is returned verbatim; the fallback path deliberately
/// skips normalization and formatting (the file is assumed pre-formatted,
/// price strings included).
pub fn load_fallback_menu(path: &Path) -> Option<Vec<Value>> {
    if !path.exists() {
        return None;
    }
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Failed to read fallback menu file");
            return None;
        }
    };
    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::error!(path = %path.display(), error = %err, "Fallback menu file is not valid JSON");
            return None;
        }
    };
    match parsed {
        Value::Array(items) => Some(items),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Some(items),
            _ => None,
        },
        _ => None,
    }
}
