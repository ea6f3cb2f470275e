//! # exif-scan
//!
//! Image metadata inspector: fingerprint an upload with SHA-256, decode it
//! with format sniffing, pull its EXIF or PNG text metadata into a JSON-safe
//! tree, and produce a copy with all metadata stripped.
//!
//! ## Quick Start
//!
//! The pipeline module runs the full hash → decode → extract → format flow
//! and builds the response record:
//!
//! ```rust,no_run
//! use exif_scan::config::Config;
//! use exif_scan::pipeline::{ResultRecord, check_upload_size, inspect_image};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!     let bytes = std::fs::read("photo.jpg")?;
//!
//!     check_upload_size(bytes.len(), config.limits.max_upload_bytes)?;
//!     let record = ResultRecord::from(inspect_image(&bytes, "photo.jpg", &config.decode_options()));
//!     println!("{}", serde_json::to_string_pretty(&record)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! Each stage can also be called on its own:
//!
//! ```rust,no_run
//! use exif_scan::decode::DecodeOptions;
//! use exif_scan::strip::StripOptions;
//! use exif_scan::{compute_hash, decode_image, extract_and_format_metadata, strip_metadata};
//!
//! fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     println!("sha256: {}", compute_hash(&bytes));
//!
//!     let image = decode_image(&bytes, &DecodeOptions::default())?;
//!     let metadata = extract_and_format_metadata(&image);
//!     println!("{}", serde_json::to_string_pretty(&metadata)?);
//!
//!     let clean = strip_metadata(&image, &StripOptions::default())?;
//!     std::fs::write("photo_cleaned.jpg", &clean.bytes)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Metadata read | Strip output |
//! |--------|---------------|--------------|
//! | JPEG | EXIF (APP1) | JPEG |
//! | PNG | EXIF (eXIf), tEXt / zTXt / iTXt | PNG |
//! | WebP | EXIF chunk | WebP (lossless) |
//! | TIFF | none | TIFF |
//! | BMP | none | BMP |
//! | Other decodable (GIF) | none | JPEG |
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`decode`] — Format sniffing and decoding
//! - [`error`] — Error types and their status codes
//! - [`exif`] — EXIF (TIFF IFD) parsing and tag names
//! - [`hash`] — Content fingerprinting
//! - [`metadata`] — Raw metadata tree, extraction and JSON-safe formatting
//! - [`pipeline`] — Per-upload inspect/clean flow and response records
//! - [`strip`] — Metadata-free re-encoding

pub mod config;
pub mod decode;
pub mod error;
pub mod exif;
pub mod hash;
pub mod metadata;
pub mod pipeline;
pub mod strip;

#[cfg(test)]
mod fixtures;

pub use decode::decode_image;
pub use hash::compute_hash;
pub use metadata::extract_and_format_metadata;
pub use strip::strip_metadata;
