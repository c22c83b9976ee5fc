//! Pure Rust raster backend over the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, GIF, WebP) | `image::ImageReader` with content-sniffed format |
//! | Surfaces | `image::RgbaImage`, zero-initialised (transparent) |
//! | Rotate / flip draw | inverse-mapped nearest-neighbour sampling |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` (single frame) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! Codec work runs on tokio's blocking pool so the calling task only
//! suspends at decode and encode.

use super::backend::{DecodedImage, ImageDecoder, IngestError, RasterCanvas, RasterSurface};
use super::geometry::Transform2D;
use super::params::{PixelCropRegion, Quality};
use super::sniff::ImageMime;
use crate::config::{EncodingConfig, IngestConfig, SurfaceConfig};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;
use std::sync::Arc;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Clone)]
pub struct RustBackend {
    surface: SurfaceConfig,
    jpeg_quality: Quality,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::from_config(&IngestConfig::default())
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        let EncodingConfig { jpeg_quality } = config.encoding;
        Self {
            surface: config.surface.clone(),
            jpeg_quality: Quality::new(jpeg_quality),
        }
    }

    fn fits_limits(&self, width: u32, height: u32) -> bool {
        width <= self.surface.max_dimension
            && height <= self.surface.max_dimension
            && u64::from(width) * u64::from(height) <= self.surface.max_area
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode bytes into RGBA8, detecting the format from the content.
fn decode_rgba(bytes: &[u8]) -> Result<DecodedImage, IngestError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| IngestError::ImageLoad(format!("Failed to sniff format: {e}")))?;
    if reader.format().is_none() {
        return Err(IngestError::ImageLoad("Unrecognised image format".into()));
    }
    let image = reader
        .decode()
        .map_err(|e| IngestError::ImageLoad(format!("Failed to decode: {e}")))?;
    Ok(DecodedImage::new(image.into_rgba8()))
}

impl ImageDecoder for RustBackend {
    async fn decode(&self, bytes: Arc<[u8]>) -> Result<DecodedImage, IngestError> {
        tokio::task::spawn_blocking(move || decode_rgba(&bytes))
            .await
            .map_err(|e| IngestError::ImageLoad(format!("Decoder task failed: {e}")))?
    }
}

impl RasterCanvas for RustBackend {
    type Surface = RustSurface;

    fn allocate(&self, width: u32, height: u32) -> Option<RustSurface> {
        if !self.fits_limits(width, height) {
            return None;
        }
        Some(RustSurface {
            pixels: RgbaImage::new(width, height),
            jpeg_quality: self.jpeg_quality,
        })
    }
}

/// An RGBA8 drawing surface.
#[derive(Debug, Clone)]
pub struct RustSurface {
    pixels: RgbaImage,
    jpeg_quality: Quality,
}

impl RustSurface {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

impl RasterSurface for RustSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn draw_image(&mut self, image: &DecodedImage, transform: &Transform2D) {
        let Some(inverse) = transform.invert() else {
            // Degenerate transform draws nothing, as on a canvas
            return;
        };
        let src = image.pixels();
        let (src_w, src_h) = (f64::from(src.width()), f64::from(src.height()));

        for (x, y, pixel) in self.pixels.enumerate_pixels_mut() {
            let (sx, sy) = inverse.apply(f64::from(x) + 0.5, f64::from(y) + 0.5);
            if sx < 0.0 || sy < 0.0 || sx >= src_w || sy >= src_h {
                continue;
            }
            *pixel = *src.get_pixel(sx.floor() as u32, sy.floor() as u32);
        }
    }

    fn copy_region(&mut self, source: &Self, region: &PixelCropRegion) {
        let copy_w = self.width().min(region.width);
        let copy_h = self.height().min(region.height);

        for dy in 0..copy_h {
            let Some(sy) = region.y.checked_add(dy).filter(|&sy| sy < source.height()) else {
                break;
            };
            for dx in 0..copy_w {
                let Some(sx) = region.x.checked_add(dx).filter(|&sx| sx < source.width()) else {
                    break;
                };
                self.pixels.put_pixel(dx, dy, *source.pixels.get_pixel(sx, sy));
            }
        }
    }

    async fn encode(self, mime: ImageMime) -> Option<Vec<u8>> {
        tokio::task::spawn_blocking(move || encode_rgba(&self.pixels, mime, self.jpeg_quality))
            .await
            .ok()
            .flatten()
    }
}

/// Encode pixels to `mime`. Empty surfaces and encoder errors give `None`.
fn encode_rgba(pixels: &RgbaImage, mime: ImageMime, jpeg_quality: Quality) -> Option<Vec<u8>> {
    let (width, height) = pixels.dimensions();
    if width == 0 || height == 0 {
        return None;
    }

    let mut buffer = Vec::new();
    let result = match mime {
        ImageMime::Png => PngEncoder::new(&mut buffer).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
        ImageMime::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(pixels.clone()).into_rgb8();
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality.value()).write_image(
                rgb.as_raw(),
                width,
                height,
                ExtendedColorType::Rgb8,
            )
        }
        ImageMime::Gif => {
            // The trailer is written when the encoder drops
            let mut encoder = GifEncoder::new(&mut buffer);
            encoder.encode(pixels.as_raw(), width, height, ExtendedColorType::Rgba8)
        }
        ImageMime::WebP => WebPEncoder::new_lossless(&mut buffer).write_image(
            pixels.as_raw(),
            width,
            height,
            ExtendedColorType::Rgba8,
        ),
    };

    if result.is_err() || buffer.is_empty() {
        return None;
    }
    Some(buffer)
}
