//! EXIF blob parsing and tag naming.
//!
//! - [`parse_exif`] — split a TIFF-structured EXIF blob into raw IFD directories
//! - [`tag_name`] — resolve a (directory, tag id) pair to its EXIF name

mod reader;
mod tags;

pub use reader::parse_exif;
pub use tags::tag_name;
