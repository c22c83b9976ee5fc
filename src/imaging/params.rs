//! Parameter types for the raster transform pipeline.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the [`pipeline`](super::pipeline) (which sequences the
//! steps) and the [`backend`](super::backend) capabilities (which do the
//! actual pixel work).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 92). Clamped on construction.
//! - [`PixelCropRegion`]: Crop rectangle in rotated-surface pixel space.
//! - [`Flip`] / [`TransformParams`]: Rotation angle and mirror flags.
//! - [`EncodedImage`]: Final buffer plus its MIME type.

use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    /// Matches the 0.92 default browsers use for `toBlob("image/jpeg")`.
    fn default() -> Self {
        Self(92)
    }
}

/// Crop rectangle in the coordinate space of the rotated, flipped surface.
///
/// `x + width` and `y + height` may exceed the surface; the overflow comes
/// out transparent rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelCropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelCropRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Mirror flags applied about the image center.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flip {
    pub horizontal: bool,
    pub vertical: bool,
}

impl Flip {
    /// Scale factors for the canvas `scale` call.
    pub fn scale_factors(self) -> (f64, f64) {
        (
            if self.horizontal { -1.0 } else { 1.0 },
            if self.vertical { -1.0 } else { 1.0 },
        )
    }
}

/// Rotation and flip applied before cropping.
///
/// `rotation_degrees` is used as-is; it is never normalized into `[0, 360)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformParams {
    pub rotation_degrees: f64,
    pub flip: Flip,
}

/// Re-encoded output of the pipeline. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub buffer: Vec<u8>,
    pub mime_type: &'static str,
}
