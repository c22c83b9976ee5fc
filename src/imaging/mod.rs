//! Image ingestion core: sniffing, geometry and the raster pipeline.
//!
//! | Operation | Function |
//! |---|---|
//! | **MIME from filename** | [`resolve_mime_type`] |
//! | **Animated?** | [`is_animated`] (GIF extension rule, WebP `ANIM` scan) |
//! | **Rotated bounds** | [`rotated_bounding_box`] |
//! | **Rotate → flip → crop → encode** | [`crop_rotate_flip`] |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for angle and bounding-box math (unit testable)
//! - **Sniff**: MIME resolution and animation detection from raw bytes
//! - **Parameters**: Data structures describing the crop and transform
//! - **Source**: [`ByteSource`] and its in-memory / on-disk implementations
//! - **Backend**: [`ImageDecoder`] + [`RasterCanvas`] capabilities and [`RustBackend`]
//! - **Pipeline**: High-level functions combining geometry + capabilities
//!
//! Nothing in here logs or retries; every failure comes back as an
//! [`IngestError`].

pub mod backend;
mod geometry;
mod params;
pub mod pipeline;
pub mod rust_backend;
mod sniff;
mod source;

pub use backend::{DecodedImage, ImageDecoder, IngestError, RasterCanvas, RasterSurface};
pub use geometry::{RotatedBoundingBox, Transform2D, rotated_bounding_box, to_radians};
pub use params::{EncodedImage, Flip, PixelCropRegion, Quality, TransformParams};
pub use pipeline::{crop_rotate_flip, full_frame_crop, load_decoded_image};
pub use rust_backend::RustBackend;
pub use sniff::{
    ACCEPTED_EXTENSIONS, GifPolicy, ImageMime, is_accepted_filename, is_animated,
    is_animated_webp, is_animated_with, resolve_mime_type,
};
pub use source::{ByteSource, FileSource, SourceBytes};
