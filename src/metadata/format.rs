use serde_json::{Map, Number, Value};

use super::{RawDirectory, RawMetadata, RawValue, TagKey};
use crate::exif::tag_name;

/// Directory name → (tag name → value), safe to serialize as JSON.
pub type FormattedMetadata = Map<String, Value>;

/// Whether a directory holds thumbnail data and is left out of the output.
///
/// Matches `"thumbnail"` ignoring case and surrounding whitespace, and the
/// EXIF `"1st"` IFD that describes the thumbnail.
pub fn is_thumbnail_directory(name: &str) -> bool {
    let name = name.trim().to_lowercase();
    name == "thumbnail" || name == "1st"
}

/// Turn a raw tree into display-ready, JSON-safe metadata.
///
/// Tag ids are resolved to EXIF names where known (otherwise the id itself
/// is used), byte strings are decoded, and rational sequences become number
/// arrays. A value that cannot be represented falls back to `"Tag <id>"`
/// with its raw string form; the rest of the tree is unaffected.
pub fn format_metadata(raw: &RawMetadata) -> FormattedMetadata {
    let mut formatted = Map::new();

    for (name, directory) in raw.iter() {
        if is_thumbnail_directory(name) {
            continue;
        }

        let value = match directory {
            RawDirectory::Tags(tags) => {
                let mut fields = Map::new();
                for (key, raw_value) in tags {
                    match safe_value(raw_value) {
                        Some(value) => {
                            fields.insert(tag_label(name, key), value);
                        }
                        None => {
                            log::debug!("{name}/{key}: falling back to raw string");
                            fields.insert(format!("Tag {key}"), Value::String(raw_value.to_string()));
                        }
                    }
                }
                Value::Object(fields)
            }
            RawDirectory::Scalar(raw_value) => {
                safe_value(raw_value).unwrap_or_else(|| Value::String(raw_value.to_string()))
            }
        };
        formatted.insert(name.to_string(), value);
    }

    formatted
}

fn tag_label(directory: &str, key: &TagKey) -> String {
    match key {
        TagKey::Id(id) => tag_name(directory, *id).unwrap_or_else(|| id.to_string()),
        TagKey::Name(name) => name.clone(),
    }
}

/// Normalize one raw value into JSON.
///
/// - bytes → UTF-8 text with NULs removed, or `"<binary: N bytes>"`
/// - a non-empty sequence of numeric pairs → `numerator / denominator` per
///   pair (the bare numerator when the denominator is zero)
/// - any other sequence → element-wise
///
/// Returns `None` only for values JSON cannot hold (non-finite floats).
pub fn safe_value(value: &RawValue) -> Option<Value> {
    match value {
        RawValue::Int(v) => Some(Value::from(*v)),
        RawValue::Float(v) => Number::from_f64(*v).map(Value::Number),
        RawValue::Text(s) => Some(Value::String(s.clone())),
        RawValue::Bytes(bytes) => Some(Value::String(decode_bytes(bytes))),
        RawValue::Seq(items) => match rationals(items) {
            Some(values) => Some(Value::Array(values)),
            None => items
                .iter()
                .map(safe_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        },
    }
}

fn decode_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.replace('\0', ""),
        Err(_) => format!("<binary: {} bytes>", bytes.len()),
    }
}

fn rationals(items: &[RawValue]) -> Option<Vec<Value>> {
    if items.is_empty() {
        return None;
    }
    items
        .iter()
        .map(|item| match item {
            RawValue::Seq(pair) if pair.len() == 2 => ratio(&pair[0], &pair[1]),
            _ => None,
        })
        .collect()
}

fn ratio(numerator: &RawValue, denominator: &RawValue) -> Option<Value> {
    let num = as_f64(numerator)?;
    let den = as_f64(denominator)?;
    if den == 0.0 {
        return safe_value(numerator);
    }
    Number::from_f64(num / den).map(Value::Number)
}

fn as_f64(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Int(v) => Some(*v as f64),
        RawValue::Float(v) => Some(*v),
        _ => None,
    }
}
