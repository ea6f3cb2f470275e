use thiserror::Error;

/// Failures surfaced by the decode and strip operations.
///
/// Metadata extraction and formatting never produce one of these; they
/// degrade to an `"Error"` entry inside the returned tree instead.
#[derive(Debug, Error)]
pub enum ImageError {
    /// The bytes do not form a decodable image of any supported format.
    #[error("Unsupported or corrupted image file")]
    UnidentifiedImage,

    /// The container was recognized but processing it failed.
    #[error("Failed to process image: {0}")]
    Decode(String),

    /// Re-encoding without metadata failed.
    #[error("Failed to clean image: {0}")]
    Strip(String),

    /// The upload exceeds the configured ceiling and never reached the decoder.
    #[error("Upload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: u64, limit: u64 },
}

impl ImageError {
    /// The HTTP-style status a boundary layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::UnidentifiedImage => 400,
            Self::PayloadTooLarge { .. } => 413,
            Self::Decode(_) | Self::Strip(_) => 500,
        }
    }
}

/// An EXIF blob whose TIFF header or first IFD cannot be read.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExifError(#[from] exif::Error);

pub type Result<T> = std::result::Result<T, ImageError>;
