//! Partitioning passes over a JSON mapping.
//!
//! Each pass turns one mapping (or, for count splitting, an array) into
//! output units. None of them look inside the values, so they apply equally
//! to a fresh [`Collection`](crate::collection::Collection) and to a JSON
//! file read back from disk.

use crate::error::FormatError;
use serde_json::{Map, Value};

/// File stem for a top-level key: path separators and drive colons become `_`.
pub fn sanitize_key(key: &str) -> String {
    key.replace(['\\', '/', ':'], "_")
}

/// One unit per top-level key: `(file stem, {key: value})`.
pub fn split_per_key(map: &Map<String, Value>) -> Vec<(String, Value)> {
    map.iter()
        .map(|(key, value)| {
            let mut unit = Map::new();
            unit.insert(key.clone(), value.clone());
            (sanitize_key(key), Value::Object(unit))
        })
        .collect()
}

/// Split the values into exactly `parts` parts of `ceil(total / parts)` items.
///
/// Objects contribute their values in key order; arrays are used as they
/// are. Once the items run out the remaining parts are empty, so the number
/// of output units never depends on the input size.
///
/// # Errors
///
/// `parts == 0` is a [`FormatError::Config`]; anything but an object or an
/// array is [`FormatError::NotSupported`].
pub fn split_by_count(data: Value, parts: usize) -> Result<Vec<Vec<Value>>, FormatError> {
    if parts == 0 {
        return Err(FormatError::Config(
            "the number of parts must be at least 1".to_string(),
        ));
    }
    let items: Vec<Value> = match data {
        Value::Object(map) => map.into_iter().map(|(_, value)| value).collect(),
        Value::Array(items) => items,
        other => {
            return Err(FormatError::NotSupported(format!(
                "count splitting needs a JSON object or array, got {}",
                json_kind(&other)
            )))
        }
    };
    let per_part = items.len().div_ceil(parts);
    Ok((0..parts)
        .map(|index| {
            let start = (index * per_part).min(items.len());
            let end = (start + per_part).min(items.len());
            items[start..end].to_vec()
        })
        .collect())
}

/// Greedy packing of whole keys into chunks of bounded serialized size.
///
/// Each key is added to the open chunk; once the chunk's compact JSON
/// encoding is larger than `max_bytes` the chunk is closed, crossing key
/// included. A key larger than `max_bytes` therefore gets a chunk of its
/// own. The last chunk is emitted when non-empty.
///
/// Sizes are measured on serde_json's compact encoding: no space after `,`
/// or `:`, and non-ASCII characters written unescaped. A spaced or
/// ASCII-escaped encoder measures the same data as larger, so a given
/// `max_bytes` closes chunks later here than it would there. Each chunk is
/// measured on its own; closed chunks never count toward the next one.
///
/// # Errors
///
/// `max_bytes == 0` is a [`FormatError::Config`].
pub fn split_by_size(
    map: &Map<String, Value>,
    max_bytes: usize,
) -> Result<Vec<Map<String, Value>>, FormatError> {
    if max_bytes == 0 {
        return Err(FormatError::Config(
            "the chunk size limit must be at least 1 byte".to_string(),
        ));
    }

    let mut chunks = Vec::new();
    let mut chunk = Map::new();
    let mut size = EMPTY_OBJECT_BYTES;

    for (key, value) in map {
        // Compact encoding: `"key":value`, comma-separated inside `{}`.
        let entry = serde_json::to_vec(key)?.len() + 1 + serde_json::to_vec(value)?.len();
        if !chunk.is_empty() {
            size += 1;
        }
        size += entry;
        chunk.insert(key.clone(), value.clone());

        if size > max_bytes {
            chunks.push(std::mem::take(&mut chunk));
            size = EMPTY_OBJECT_BYTES;
        }
    }
    if !chunk.is_empty() {
        chunks.push(chunk);
    }
    Ok(chunks)
}

const EMPTY_OBJECT_BYTES: usize = 2;

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
