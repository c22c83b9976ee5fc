//! Pipeline configuration.
//!
//! Handles loading and validating an optional `icon-ingest.toml`. Every key
//! has a default, so the file only needs the values it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [encoding]
//! jpeg_quality = 92          # JPEG output quality (1-100)
//!
//! [surface]
//! max_dimension = 32767      # Largest side of any raster surface, in pixels
//! max_area = 268435456       # Largest surface area, in pixels
//!
//! [sniffer]
//! gif_policy = "extension"   # "extension" or "frame-count"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::GifPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "icon-ingest.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `icon-ingest.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    /// Output encoder settings.
    pub encoding: EncodingConfig,
    /// Raster surface allocation limits.
    pub surface: SurfaceConfig,
    /// Animated-image classification.
    pub sniffer: SnifferConfig,
}

impl IngestConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.encoding.jpeg_quality) {
            return Err(ConfigError::Validation(
                "encoding.jpeg_quality must be 1-100".into(),
            ));
        }
        if self.surface.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "surface.max_dimension must be non-zero".into(),
            ));
        }
        if self.surface.max_area == 0 {
            return Err(ConfigError::Validation(
                "surface.max_area must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Output encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EncodingConfig {
    /// JPEG quality (1 = worst, 100 = best).
    pub jpeg_quality: u8,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self { jpeg_quality: 92 }
    }
}

/// Raster surface allocation limits.
///
/// Defaults follow the canvas limits of mainstream browsers, so a crop that
/// works here also works in the web client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    pub max_dimension: u32,
    pub max_area: u64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            max_dimension: 32_767,
            max_area: 268_435_456,
        }
    }
}

/// Animated-image classification settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnifferConfig {
    pub gif_policy: GifPolicy,
}

/// Load and validate a config file.
pub fn load_config(path: &Path) -> Result<IngestConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: IngestConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Resolve the effective config.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in `dir`
/// is used when present, otherwise stock defaults.
pub fn resolve_config(explicit: Option<&Path>, dir: &Path) -> Result<IngestConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    let implicit = dir.join(DEFAULT_CONFIG_FILE);
    if implicit.exists() {
        load_config(&implicit)
    } else {
        Ok(IngestConfig::default())
    }
}

/// Returns a fully-commented stock `icon-ingest.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# icon-ingest Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output encoding
# ---------------------------------------------------------------------------
[encoding]
# JPEG quality for .jpg/.jpeg outputs (1 = worst, 100 = best).
# PNG and WebP outputs are lossless; GIF outputs are palette-quantised.
jpeg_quality = 92

# ---------------------------------------------------------------------------
# Raster surfaces
# ---------------------------------------------------------------------------
[surface]
# Largest width or height of the intermediate and output surfaces.
max_dimension = 32767

# Largest width * height of any surface.
max_area = 268435456

# ---------------------------------------------------------------------------
# Animated-image sniffing
# ---------------------------------------------------------------------------
[sniffer]
# "extension":   every .gif upload is treated as animated.
# "frame-count": a .gif is animated only if it has two or more frames.
gif_policy = "extension"
"##
}
