use exif::{Context, Exif, Field, In, Reader, Tag, Value};

use crate::error::ExifError;
use crate::metadata::{RawMetadata, RawValue, TagKey};

// Some writers keep the JPEG APP1 header in front of the TIFF data
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Directories reported for every parsed blob, in output order.
const DIRECTORIES: [&str; 5] = ["0th", "Exif", "GPS", "Interop", "1st"];

/// Parse a raw EXIF blob into the "0th", "Exif", "GPS", "Interop" and "1st"
/// directories, plus "thumbnail" when IFD1 points at an embedded JPEG.
///
/// Only a broken header or IFD0 is fatal. Fields and sub-IFDs that cannot
/// be read are skipped with a warning.
pub fn parse_exif(blob: &[u8]) -> Result<RawMetadata, ExifError> {
    let blob = blob.strip_prefix(EXIF_HEADER).unwrap_or(blob);
    let exif = Reader::new()
        .continue_on_error(true)
        .read_raw(blob.to_vec())
        .or_else(|e| {
            e.distill_partial_result(|errors| {
                for error in errors {
                    log::warn!("Skipped part of the EXIF data: {error}");
                }
            })
        })?;

    let mut directories: Vec<(&str, Vec<(TagKey, RawValue)>)> =
        DIRECTORIES.iter().map(|name| (*name, Vec::new())).collect();

    for field in exif.fields() {
        let Some(name) = directory_of(field) else {
            log::debug!("Ignoring {} in {:?}", field.tag, field.ifd_num);
            continue;
        };
        let Some(value) = raw_value(&field.value) else {
            log::debug!("Skipping {}: unknown field type", field.tag);
            continue;
        };
        if let Some((_, tags)) = directories.iter_mut().find(|(n, _)| *n == name) {
            tags.push((TagKey::Id(field.tag.number()), value));
        }
    }

    let mut tree = RawMetadata::new();
    for (name, tags) in directories {
        log::debug!("EXIF {name}: {} tags", tags.len());
        tree.insert_tags(name, tags);
    }
    if let Some(thumbnail) = thumbnail(&exif) {
        tree.insert_scalar("thumbnail", RawValue::Bytes(thumbnail));
    }
    Ok(tree)
}

fn directory_of(field: &Field) -> Option<&'static str> {
    let primary = field.ifd_num == In::PRIMARY;
    match field.tag.context() {
        Context::Tiff if primary => Some("0th"),
        Context::Tiff if field.ifd_num == In::THUMBNAIL => Some("1st"),
        Context::Exif if primary => Some("Exif"),
        Context::Gps if primary => Some("GPS"),
        Context::Interop if primary => Some("Interop"),
        _ => None,
    }
}

/// The JPEG thumbnail IFD1 points at, if it lies inside the blob.
fn thumbnail(exif: &Exif) -> Option<Vec<u8>> {
    let offset = exif
        .get_field(Tag::JPEGInterchangeFormat, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;
    let len = exif
        .get_field(Tag::JPEGInterchangeFormatLength, In::THUMBNAIL)?
        .value
        .get_uint(0)? as usize;

    let bytes = offset
        .checked_add(len)
        .and_then(|end| exif.buf().get(offset..end));
    if bytes.is_none() {
        log::warn!("Thumbnail at {offset}+{len} lies outside the EXIF data");
    }
    bytes.map(<[u8]>::to_vec)
}

/// Map a field value onto the raw tree: ASCII and UNDEFINED stay bytes,
/// numbers collapse to a scalar when there is exactly one.
fn raw_value(value: &Value) -> Option<RawValue> {
    let raw = match value {
        Value::Byte(v) => ints(v.iter().map(|&x| x as i64)),
        Value::SByte(v) => ints(v.iter().map(|&x| x as i64)),
        Value::Short(v) => ints(v.iter().map(|&x| x as i64)),
        Value::SShort(v) => ints(v.iter().map(|&x| x as i64)),
        Value::Long(v) => ints(v.iter().map(|&x| x as i64)),
        Value::SLong(v) => ints(v.iter().map(|&x| x as i64)),
        Value::Rational(v) => collapse(
            v.iter()
                .map(|r| RawValue::rational(r.num as i64, r.denom as i64))
                .collect(),
        ),
        Value::SRational(v) => collapse(
            v.iter()
                .map(|r| RawValue::rational(r.num as i64, r.denom as i64))
                .collect(),
        ),
        Value::Float(v) => collapse(v.iter().map(|&x| RawValue::Float(x as f64)).collect()),
        Value::Double(v) => collapse(v.iter().map(|&x| RawValue::Float(x)).collect()),
        // Split on NUL by the reader; the trailing terminator is already gone
        Value::Ascii(strings) => RawValue::Bytes(strings.join(&0u8)),
        Value::Undefined(bytes, _) => RawValue::Bytes(bytes.clone()),
        _ => return None,
    };
    Some(raw)
}

fn ints(values: impl Iterator<Item = i64>) -> RawValue {
    collapse(values.map(RawValue::Int).collect())
}

/// Single values stand alone; anything else stays a sequence.
fn collapse(mut values: Vec<RawValue>) -> RawValue {
    if values.len() == 1 {
        values.swap_remove(0)
    } else {
        RawValue::Seq(values)
    }
}
