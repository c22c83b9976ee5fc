//! Capability traits and shared types for the raster pipeline.
//!
//! The pipeline never touches a concrete image library. It talks to two
//! capabilities:
//!
//! - [`ImageDecoder`] turns raw bytes into a [`DecodedImage`].
//! - [`RasterCanvas`] allocates [`RasterSurface`]s, which can be drawn to,
//!   blitted between, and finally encoded.
//!
//! The production implementation of both is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in the
//! recording mocks below.

use super::geometry::Transform2D;
use super::params::PixelCropRegion;
use super::sniff::ImageMime;
use image::RgbaImage;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to load image: {0}")]
    ImageLoad(String),
    #[error("No 2D raster context for a {width}x{height} surface")]
    ContextUnavailable { width: u32, height: u32 },
    #[error("Encoder produced no {mime} output")]
    BlobEncoding { mime: &'static str },
    #[error("Unsupported file: {0}")]
    UnsupportedFile(String),
}

/// A decoded raster, always normalized to 8-bit RGBA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pixels: RgbaImage,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// Decodes uploaded bytes into pixels.
pub trait ImageDecoder: Sync {
    /// Fails with [`IngestError::ImageLoad`] when the bytes are not a
    /// decodable image.
    fn decode(
        &self,
        bytes: Arc<[u8]>,
    ) -> impl Future<Output = Result<DecodedImage, IngestError>> + Send;
}

/// Allocates off-screen drawing surfaces.
pub trait RasterCanvas: Sync {
    type Surface: RasterSurface;

    /// A fresh, fully transparent surface, or `None` when the host cannot
    /// provide a drawing context of that size.
    fn allocate(&self, width: u32, height: u32) -> Option<Self::Surface>;
}

/// An addressable 2D pixel buffer.
pub trait RasterSurface: Send + Sized {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Draw `image` at its natural size, mapping image space to surface
    /// space through `transform`.
    fn draw_image(&mut self, image: &DecodedImage, transform: &Transform2D);

    /// Copy `region` of `source` to this surface's origin, 1:1. Parts of
    /// the region outside `source` stay transparent.
    fn copy_region(&mut self, source: &Self, region: &PixelCropRegion);

    /// Encode the surface. `None` means the encoder produced nothing.
    fn encode(self, mime: ImageMime) -> impl Future<Output = Option<Vec<u8>>> + Send;
}
