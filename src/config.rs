use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::decode::DecodeOptions;
use crate::strip::StripOptions;

/// Default upload ceiling: 200 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Top-level configuration for exif-scan.
///
/// Controls the upload ceiling and decoder limits, how stripped images are
/// re-encoded, and how results are printed.
///
/// # Loading
///
/// ```rust,no_run
/// use exif_scan::config::Config;
///
/// // From a JSON file
/// let config = Config::load(Some("config.json".as_ref())).unwrap();
///
/// // Or use defaults and customize
/// let mut config = Config::default();
/// config.strip.jpeg_quality = 90;
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upload size and decoder limits.
    pub limits: LimitsConfig,
    /// Re-encoding settings for stripped images.
    pub strip: StripConfig,
    /// Output formatting.
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Inputs larger than this are rejected before decoding.
    pub max_upload_bytes: u64,
    /// If `true`, lift the decoder's pixel-count limits.
    pub unbounded_pixels: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StripConfig {
    /// JPEG quality (1–100) used when re-encoding JPEG output.
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON results.
    pub pretty_json: bool,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            unbounded_pixels: true,
        }
    }
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: StripOptions::default().jpeg_quality,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty_json: true }
    }
}

impl Config {
    /// Default location: `config.json` beside the running executable.
    pub fn config_path() -> Result<PathBuf> {
        let exe = std::env::current_exe().context("Cannot locate the exif-scan executable")?;
        let dir = exe
            .parent()
            .context("Executable path has no parent directory")?;
        Ok(dir.join("config.json"))
    }

    fn resolve(path: Option<&Path>) -> Result<PathBuf> {
        path.map_or_else(Self::config_path, |p| Ok(p.to_path_buf()))
    }

    /// Read settings from `path` (or the default location). A missing file
    /// means all defaults; missing keys fall back to their defaults too.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve(path)?;
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Cannot read {}", path.display()));
            }
        };
        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Write these settings as pretty JSON and return where they went.
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = Self::resolve(path)?;
        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Cannot write {}", path.display()))?;
        log::debug!("Config saved to {}", path.display());
        Ok(path)
    }

    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            unbounded_pixels: self.limits.unbounded_pixels,
        }
    }

    pub fn strip_options(&self) -> StripOptions {
        StripOptions {
            jpeg_quality: self.strip.jpeg_quality,
        }
    }
}
