use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ImageResult};
use std::borrow::Cow;
use std::io::Cursor;

use crate::decode::{DecodedImage, ImageKind};
use crate::error::{ImageError, Result};

/// Options for [`strip_metadata`].
#[derive(Debug, Clone, Copy)]
pub struct StripOptions {
    /// JPEG quality (1–100) for JPEG output, including the fallback path.
    pub jpeg_quality: u8,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self { jpeg_quality: 75 }
    }
}

/// A re-encoded image with no embedded metadata.
#[derive(Debug, Clone)]
pub struct CleanImage {
    /// Container the bytes are encoded in.
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

/// Re-encode the decoded pixels in their original container, without
/// any EXIF blob, text chunks or extra tags.
///
/// The encoders only write what the pixel data needs, so the output carries
/// an empty metadata container by construction. BMP has none to clear.
/// Containers without an encoder of their own are flattened to 8-bit RGB and
/// written as JPEG.
///
/// # Errors
///
/// [`ImageError::Strip`] when the encoder rejects the pixel data (for
/// example a color type the target format cannot store).
pub fn strip_metadata(image: &DecodedImage, options: &StripOptions) -> Result<CleanImage> {
    let (kind, pixels) = match image.kind() {
        ImageKind::Unknown => {
            log::info!("No encoder for {}, re-encoding as JPEG", image.format_name());
            let rgb = DynamicImage::ImageRgb8(image.pixels().to_rgb8());
            (ImageKind::Jpeg, Cow::Owned(rgb))
        }
        kind => (kind, Cow::Borrowed(image.pixels())),
    };

    let bytes = encode(&pixels, kind, options.jpeg_quality.clamp(1, 100))
        .map_err(|e| ImageError::Strip(e.to_string()))?;

    log::debug!("Re-encoded {} without metadata: {} bytes", kind.name(), bytes.len());
    Ok(CleanImage { kind, bytes })
}

fn encode(pixels: &DynamicImage, kind: ImageKind, jpeg_quality: u8) -> ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    match kind {
        ImageKind::Png => pixels.write_with_encoder(PngEncoder::new(&mut out))?,
        ImageKind::Tiff => pixels.write_with_encoder(TiffEncoder::new(&mut out))?,
        ImageKind::Bmp => pixels.write_with_encoder(BmpEncoder::new(&mut out))?,
        ImageKind::WebP => pixels.write_with_encoder(WebPEncoder::new_lossless(&mut out))?,
        ImageKind::Jpeg | ImageKind::Unknown => {
            pixels.write_with_encoder(JpegEncoder::new_with_quality(&mut out, jpeg_quality))?
        }
    }
    Ok(out.into_inner())
}
