//! The raw metadata model and the two passes over it.
//!
//! - [`extract_metadata`] — container info → [`RawMetadata`] (never fails)
//! - [`format_metadata`] — [`RawMetadata`] → JSON-safe [`FormattedMetadata`] (never fails)
//!
//! [`extract_and_format_metadata`] chains both.

mod extract;
mod format;

use std::fmt;

use crate::decode::DecodedImage;

pub use extract::extract_metadata;
pub use format::{FormattedMetadata, format_metadata, is_thumbnail_directory, safe_value};

/// A value as it was stored in the container, before any normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    /// Tuples and arrays. A rational is a two-element `Seq` of `Int`s.
    Seq(Vec<RawValue>),
}

impl RawValue {
    pub fn rational(numerator: i64, denominator: i64) -> Self {
        Self::Seq(vec![Self::Int(numerator), Self::Int(denominator)])
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            Self::Seq(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Key of a tag inside a directory: a numeric EXIF id or a chunk keyword.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKey {
    Id(u16),
    Name(String),
}

impl fmt::Display for TagKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One top-level entry of a [`RawMetadata`] tree.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDirectory {
    Tags(Vec<(TagKey, RawValue)>),
    Scalar(RawValue),
}

/// Ordered directory name → directory mapping, as extracted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    entries: Vec<(String, RawDirectory)>,
}

impl RawMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a directory of tags.
    pub fn insert_tags(&mut self, name: impl Into<String>, tags: Vec<(TagKey, RawValue)>) {
        self.insert(name.into(), RawDirectory::Tags(tags));
    }

    /// Insert or replace a bare top-level value.
    pub fn insert_scalar(&mut self, name: impl Into<String>, value: RawValue) {
        self.insert(name.into(), RawDirectory::Scalar(value));
    }

    fn insert(&mut self, name: String, directory: RawDirectory) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = directory,
            None => self.entries.push((name, directory)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&RawDirectory> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawDirectory)> {
        self.entries.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Extract the raw tree from a decoded image and format it for display.
pub fn extract_and_format_metadata(image: &DecodedImage) -> FormattedMetadata {
    format_metadata(&extract_metadata(image))
}
