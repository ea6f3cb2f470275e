use super::{RawMetadata, RawValue, TagKey};
use crate::decode::{DecodedImage, ImageKind};
use crate::exif::parse_exif;

const NO_PNG_CHUNKS: &str = "No PNG chunks found.";
const NO_EXIF: &str = "No EXIF metadata found in this image.";

/// Build the raw metadata tree for a decoded image.
///
/// Never fails: an EXIF blob that cannot be parsed becomes a single
/// `"Error"` entry, and an image without metadata gets one informational
/// entry instead of an empty tree.
///
/// 1. An embedded EXIF blob wins, whatever the container.
/// 2. PNG ancillary and text chunks (minus any `exif` key) go under `"PNG Info"`.
/// 3. Everything else reports its format and a "no EXIF" message.
pub fn extract_metadata(image: &DecodedImage) -> RawMetadata {
    let info = image.info();
    let mut tree = RawMetadata::new();

    if let Some(blob) = &info.exif {
        return match parse_exif(blob) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Failed to parse EXIF: {e}");
                tree.insert_scalar("Error", RawValue::Text(format!("Failed to parse EXIF: {e}")));
                tree
            }
        };
    }

    if image.kind() == ImageKind::Png {
        let chunks: Vec<(TagKey, RawValue)> = info
            .png_info
            .iter()
            .filter(|(key, _)| key != "exif")
            .map(|(key, value)| (TagKey::Name(key.clone()), RawValue::Text(value.clone())))
            .collect();

        if chunks.is_empty() {
            tree.insert_scalar("Info", RawValue::Text(NO_PNG_CHUNKS.to_string()));
        } else {
            tree.insert_tags("PNG Info", chunks);
        }
        return tree;
    }

    tree.insert_scalar("Format", RawValue::Text(image.format_name()));
    tree.insert_scalar("Message", RawValue::Text(NO_EXIF.to_string()));
    tree
}
