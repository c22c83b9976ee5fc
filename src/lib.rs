//! # icon-ingest
//!
//! Image ingestion for user-supplied icons: decide whether an upload is
//! animated, and if it is not, rotate, flip, crop and re-encode it.
//!
//! # Architecture: Sniff, Then Transform
//!
//! ```text
//! upload ──▶ is_animated ──true──▶ pass through untouched
//!                 │
//!               false
//!                 ▼
//!        crop_rotate_flip ──▶ EncodedImage { buffer, mime_type }
//! ```
//!
//! The transform is a two-stage raster composition: the decoded image is
//! drawn rotated and flipped about its center onto a surface sized to its
//! rotated bounding box, then the crop rectangle is copied 1:1 onto an output
//! surface and encoded in the format implied by the output filename.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Core: geometry, sniffing, capability traits, pipeline, `image`-crate backend |
//! | [`ingest`] | Headless orchestrator: sniff first, then pass through or crop |
//! | [`config`] | `icon-ingest.toml` loading and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Capabilities, Not a Canvas
//!
//! The pipeline is written against [`imaging::ImageDecoder`] and
//! [`imaging::RasterCanvas`] instead of a concrete image library. The
//! production [`imaging::RustBackend`] uses the `image` crate; tests use a
//! recording mock that can refuse allocations or produce no encoder output
//! on demand.
//!
//! ## Content Over Names
//!
//! Formats are sniffed from bytes. The one exception is GIF: every `.gif`
//! upload counts as animated without looking inside, unless the config opts
//! into frame counting ([`imaging::GifPolicy`]).
//!
//! ## Silent Core
//!
//! The [`imaging`] module never logs and never retries. Errors come back as
//! [`imaging::IngestError`] and the caller decides what to tell the user.

pub mod config;
pub mod imaging;
pub mod ingest;
pub mod output;

#[cfg(test)]
pub(crate) mod test_helpers;
