use serde::Serialize;

use crate::decode::{DecodeOptions, decode_image};
use crate::error::{ImageError, Result};
use crate::hash::compute_hash;
use crate::metadata::{FormattedMetadata, extract_and_format_metadata};
use crate::strip::{CleanImage, StripOptions, strip_metadata};

/// Everything reported about one uploaded image.
///
/// # Example
///
/// ```rust,no_run
/// use exif_scan::decode::DecodeOptions;
/// use exif_scan::pipeline::inspect_image;
///
/// let bytes = std::fs::read("photo.jpg").unwrap();
/// let report = inspect_image(&bytes, "photo.jpg", &DecodeOptions::default()).unwrap();
///
/// println!("{} ({})", report.filename, report.format);
/// if let Some(gps) = report.metadata.get("GPS") {
///     println!("GPS: {gps}");
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    /// SHA-256 of the uploaded bytes.
    pub hash: String,
    pub metadata: FormattedMetadata,
    pub filename: String,
    /// Detected container format, e.g. `"JPEG"`.
    pub format: String,
}

/// The response body: a report, or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResultRecord {
    Success(InspectReport),
    Failure { error: String },
}

impl From<Result<InspectReport>> for ResultRecord {
    fn from(result: Result<InspectReport>) -> Self {
        match result {
            Ok(report) => Self::Success(report),
            Err(e) => Self::Failure {
                error: e.to_string(),
            },
        }
    }
}

/// Reject uploads over the configured ceiling before they reach the decoder.
pub fn check_upload_size(len: usize, limit: u64) -> Result<()> {
    let size = len as u64;
    if size > limit {
        return Err(ImageError::PayloadTooLarge { size, limit });
    }
    Ok(())
}

/// Hash, decode, and extract + format metadata for one upload.
pub fn inspect_image(bytes: &[u8], filename: &str, options: &DecodeOptions) -> Result<InspectReport> {
    let image = decode_image(bytes, options)?;
    let metadata = extract_and_format_metadata(&image);

    Ok(InspectReport {
        hash: compute_hash(bytes),
        metadata,
        filename: filename.to_string(),
        format: image.format_name(),
    })
}

/// Decode an upload and re-encode it without metadata.
pub fn clean_image(
    bytes: &[u8],
    decode_options: &DecodeOptions,
    strip_options: &StripOptions,
) -> Result<CleanImage> {
    let image = decode_image(bytes, decode_options)?;
    strip_metadata(&image, strip_options)
}

/// Split `name` into stem and extension (with its dot). Leading dots of the
/// final path component do not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    let base_start = name.rfind('/').map_or(0, |i| i + 1);
    let base = &name[base_start..];
    match base.rfind('.') {
        Some(dot) if base[..dot].chars().any(|c| c != '.') => name.split_at(base_start + dot),
        _ => (name, ""),
    }
}

/// Lowercased extension of `filename`, `.jpg` when it has none.
fn download_extension(filename: &str) -> String {
    match split_extension(filename).1 {
        "" => ".jpg".to_string(),
        ext => ext.to_lowercase(),
    }
}

/// Download name for a stripped upload: `<stem>_cleaned<ext>`.
///
/// # Example
///
/// ```rust
/// use exif_scan::pipeline::cleaned_filename;
///
/// assert_eq!(cleaned_filename("IMG_0042.JPG"), "IMG_0042_cleaned.jpg");
/// assert_eq!(cleaned_filename("scan"), "scan_cleaned.jpg");
/// ```
pub fn cleaned_filename(filename: &str) -> String {
    let (stem, _) = split_extension(filename);
    format!("{stem}_cleaned{}", download_extension(filename))
}

/// Best-effort MIME type derived from the download extension.
pub fn mime_type_for(filename: &str) -> String {
    let ext = download_extension(filename);
    match ext.as_str() {
        ".jpg" | ".jpeg" => "image/jpeg".to_string(),
        _ => format!("image/{}", ext.replace('.', "")),
    }
}
