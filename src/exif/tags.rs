use exif::{Context, Tag};

/// Human-readable EXIF name for a tag id within one of the parsed
/// directories, or `None` when the directory or the tag is not known.
pub fn tag_name(directory: &str, id: u16) -> Option<String> {
    let context = match directory {
        "0th" | "1st" => Context::Tiff,
        "Exif" => Context::Exif,
        "GPS" => Context::Gps,
        "Interop" => Context::Interop,
        _ => return None,
    };
    let tag = Tag(context, id);
    // Only tags the crate knows carry a description; the rest display as ids
    tag.description().map(|_| tag.to_string())
}
