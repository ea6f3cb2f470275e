use image::{DynamicImage, ImageFormat, ImageReader};
use img_parts::{Bytes, DynImage, ImageEXIF};
use std::io::Cursor;

use crate::error::{ImageError, Result};

/// Container format of a decoded image, detected from its bytes.
///
/// Anything the `image` crate can decode but that has no dedicated metadata
/// handling here (GIF, for instance) is reported as [`ImageKind::Unknown`].
///
/// # Example
///
/// ```rust
/// use exif_scan::decode::ImageKind;
/// use image::ImageFormat;
///
/// assert_eq!(ImageKind::from_format(ImageFormat::Jpeg), ImageKind::Jpeg);
/// assert_eq!(ImageKind::from_format(ImageFormat::Gif), ImageKind::Unknown);
/// assert_eq!(ImageKind::WebP.name(), "WEBP");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// JPEG: EXIF in an APP1 segment
    Jpeg,
    /// PNG: ancillary and text chunks, EXIF in an eXIf chunk
    Png,
    /// TIFF: the tag directory is the container itself
    Tiff,
    /// BMP: no metadata container
    Bmp,
    /// WebP: EXIF in a RIFF chunk
    WebP,
    Unknown,
}

impl ImageKind {
    pub fn from_format(format: ImageFormat) -> Self {
        match format {
            ImageFormat::Jpeg => Self::Jpeg,
            ImageFormat::Png => Self::Png,
            ImageFormat::Tiff => Self::Tiff,
            ImageFormat::Bmp => Self::Bmp,
            ImageFormat::WebP => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Upper-case format name, as reported to callers.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::Tiff => "TIFF",
            Self::Bmp => "BMP",
            Self::WebP => "WEBP",
            Self::Unknown => "UNKNOWN",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
            Self::Unknown => "application/octet-stream",
        }
    }
}

/// Options for [`decode_image`].
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Lift the decoder's dimension and allocation limits. Large inputs are
    /// bounded by the upload size instead.
    pub unbounded_pixels: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            unbounded_pixels: true,
        }
    }
}

/// Metadata carried by the container, gathered at decode time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageInfo {
    /// Raw EXIF (TIFF-structured) blob, when the container embeds one.
    pub exif: Option<Vec<u8>>,
    /// PNG info entries (ancillary chunk values and text chunks), key → text.
    pub png_info: Vec<(String, String)>,
}

/// A fully decoded image together with its container metadata.
///
/// Only [`decode_image`] builds one, and only after every pixel decoded.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    kind: ImageKind,
    format: ImageFormat,
    pixels: DynamicImage,
    info: ImageInfo,
}

impl DecodedImage {
    pub fn kind(&self) -> ImageKind {
        self.kind
    }

    /// Format name for display. Unknown kinds keep the decoder's own name.
    pub fn format_name(&self) -> String {
        match self.kind {
            ImageKind::Unknown => format!("{:?}", self.format).to_uppercase(),
            kind => kind.name().to_string(),
        }
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }

    pub fn info(&self) -> &ImageInfo {
        &self.info
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.pixels.width(), self.pixels.height())
    }
}

/// Identify the container from its bytes and decode every pixel.
///
/// # Errors
///
/// [`ImageError::UnidentifiedImage`] for bytes that are not a recognizable
/// image or whose pixel data is corrupt or truncated; [`ImageError::Decode`]
/// for any other failure.
pub fn decode_image(bytes: &[u8], options: &DecodeOptions) -> Result<DecodedImage> {
    if bytes.is_empty() {
        return Err(ImageError::UnidentifiedImage);
    }

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageError::Decode(e.to_string()))?;

    let Some(format) = reader.format() else {
        log::debug!("No known signature in {} bytes", bytes.len());
        return Err(ImageError::UnidentifiedImage);
    };

    if options.unbounded_pixels {
        reader.no_limits();
    }

    let pixels = reader.decode().map_err(classify_decode_error)?;
    let kind = ImageKind::from_format(format);
    let info = read_info(bytes, kind);

    log::debug!(
        "Decoded {:?} {}x{} (exif: {}, png info: {})",
        format,
        pixels.width(),
        pixels.height(),
        info.exif.as_ref().map_or(0, Vec::len),
        info.png_info.len()
    );

    Ok(DecodedImage {
        kind,
        format,
        pixels,
        info,
    })
}

fn classify_decode_error(err: image::ImageError) -> ImageError {
    match err {
        image::ImageError::Decoding(_) | image::ImageError::Unsupported(_) => {
            ImageError::UnidentifiedImage
        }
        image::ImageError::IoError(ref io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
            ImageError::UnidentifiedImage
        }
        other => ImageError::Decode(other.to_string()),
    }
}

fn read_info(bytes: &[u8], kind: ImageKind) -> ImageInfo {
    let exif = match kind {
        ImageKind::Jpeg | ImageKind::Png | ImageKind::WebP => read_exif_blob(bytes),
        _ => None,
    };
    let png_info = match kind {
        ImageKind::Png => read_png_info(bytes),
        _ => Vec::new(),
    };
    ImageInfo { exif, png_info }
}

/// Pull the EXIF payload out of a JPEG, PNG or WebP container.
fn read_exif_blob(bytes: &[u8]) -> Option<Vec<u8>> {
    match DynImage::from_bytes(Bytes::copy_from_slice(bytes)) {
        Ok(Some(image)) => image.exif().filter(|exif| !exif.is_empty()).map(|exif| exif.to_vec()),
        Ok(None) => None,
        Err(e) => {
            log::debug!("Could not read container segments: {e}");
            None
        }
    }
}

/// Collect the PNG info entries: ancillary chunk values first, then tEXt,
/// zTXt and iTXt text from anywhere in the file.
fn read_png_info(bytes: &[u8]) -> Vec<(String, String)> {
    let mut reader = match png::Decoder::new(Cursor::new(bytes)).read_info() {
        Ok(reader) => reader,
        Err(e) => {
            log::warn!("Could not read PNG chunks: {e}");
            return Vec::new();
        }
    };
    // Skip the image data so chunks after IDAT land in the info too
    if let Err(e) = reader.finish() {
        log::debug!("Stopped reading PNG chunks early: {e}");
    }
    let info = reader.info();

    let mut entries: Vec<(String, String)> = Vec::new();
    let mut push = |keyword: &str, value: String| {
        match entries.iter_mut().find(|(k, _)| k == keyword) {
            Some(entry) => entry.1 = value,
            None => entries.push((keyword.to_string(), value)),
        }
    };

    if info.interlaced {
        push("interlace", "1".to_string());
    }
    if let Some(gamma) = info.gama_chunk {
        push("gamma", format!("{:?}", gamma.into_scaled() as f64 / 100_000.0));
    }
    if let Some(intent) = info.srgb {
        push("srgb", (intent as u8).to_string());
    }
    if let Some(profile) = &info.icc_profile {
        push("icc_profile", bytes_literal(profile));
    }
    if let Some(dims) = info.pixel_dims {
        match dims.unit {
            png::Unit::Meter => push(
                "dpi",
                format!(
                    "({:?}, {:?})",
                    dims.xppu as f64 * INCHES_PER_METER,
                    dims.yppu as f64 * INCHES_PER_METER
                ),
            ),
            png::Unit::Unspecified => push("aspect", format!("({}, {})", dims.xppu, dims.yppu)),
        }
    }
    if let Some(trns) = &info.trns {
        if let Some(value) = transparency(info.color_type, info.bit_depth, trns) {
            push("transparency", value);
        }
    }

    for chunk in &info.uncompressed_latin1_text {
        push(&chunk.keyword, chunk.text.clone());
    }
    for chunk in &info.compressed_latin1_text {
        match chunk.get_text() {
            Ok(value) => push(&chunk.keyword, value),
            Err(e) => log::debug!("Skipping zTXt {:?}: {e}", chunk.keyword),
        }
    }
    for chunk in &info.utf8_text {
        match chunk.get_text() {
            Ok(value) => push(&chunk.keyword, value),
            Err(e) => log::debug!("Skipping iTXt {:?}: {e}", chunk.keyword),
        }
    }

    entries
}

const INCHES_PER_METER: f64 = 0.0254;

/// tRNS as a palette index, a gray level or an `(r, g, b)` key.
fn transparency(color: png::ColorType, depth: png::BitDepth, trns: &[u8]) -> Option<String> {
    // Below 16 bits the decoder keeps one byte per key sample
    let samples: Vec<u16> = if depth == png::BitDepth::Sixteen {
        trns.chunks_exact(2).map(|b| u16::from_be_bytes([b[0], b[1]])).collect()
    } else {
        trns.iter().map(|&b| u16::from(b)).collect()
    };
    match (color, samples.as_slice()) {
        (png::ColorType::Indexed, _) => {
            let mut partial = trns.iter().enumerate().filter(|(_, alpha)| **alpha != 0xFF);
            match (partial.next(), partial.next()) {
                (Some((index, &0)), None) => Some(index.to_string()),
                _ => Some(bytes_literal(trns)),
            }
        }
        (png::ColorType::Grayscale, [gray, ..]) => Some(gray.to_string()),
        (png::ColorType::Rgb, [r, g, b, ..]) => Some(format!("({r}, {g}, {b})")),
        _ => None,
    }
}

/// Byte-string literal form, printable ASCII kept and everything else escaped.
fn bytes_literal(bytes: &[u8]) -> String {
    let mut out = String::from("b'");
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\'' => out.push_str("\\'"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{b:02x}")),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
impl DecodedImage {
    /// Wrap pixels directly, for exercising encoders on shapes no decoder yields.
    pub(crate) fn from_pixels(kind: ImageKind, format: ImageFormat, pixels: DynamicImage) -> Self {
        Self {
            kind,
            format,
            pixels,
            info: ImageInfo::default(),
        }
    }
}
