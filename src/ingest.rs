//! Headless ingestion flow: sniff, then pass through or crop.
//!
//! Mirrors what the upload modal does in the web client. Animated uploads go
//! out untouched; static uploads go through
//! [`crop_rotate_flip`](crate::imaging::crop_rotate_flip). This layer is the
//! one that logs; the imaging core stays silent.

use crate::imaging::{
    ByteSource, EncodedImage, GifPolicy, ImageDecoder, IngestError, PixelCropRegion, RasterCanvas,
    SourceBytes, TransformParams, crop_rotate_flip, full_frame_crop, is_accepted_filename,
    is_animated_with, load_decoded_image,
};
use std::sync::Arc;
use tracing::{debug, info};

/// What the caller wants done with a static upload.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRequest {
    /// Crop in rotated-image space; `None` keeps the whole rotated frame.
    pub crop: Option<PixelCropRegion>,
    /// Decides the output encoding by extension.
    pub output_filename: String,
    pub transform: TransformParams,
}

impl CropRequest {
    pub fn new(output_filename: impl Into<String>) -> Self {
        Self {
            crop: None,
            output_filename: output_filename.into(),
            transform: TransformParams::default(),
        }
    }

    pub fn with_crop(mut self, crop: PixelCropRegion) -> Self {
        self.crop = Some(crop);
        self
    }

    pub fn with_transform(mut self, transform: TransformParams) -> Self {
        self.transform = transform;
        self
    }
}

/// Which output channel an upload ended up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Original bytes, byte-for-byte.
    Animated { filename: String, bytes: Arc<[u8]> },
    /// Re-encoded crop of a static upload.
    Cropped(EncodedImage),
}

/// Run one upload through the ingestion flow.
///
/// The source is read exactly once; the sniffer, the pass-through and the
/// pipeline all see that same buffer.
///
/// # Errors
/// [`IngestError::UnsupportedFile`] for extensions outside
/// [`ACCEPTED_EXTENSIONS`](crate::imaging::ACCEPTED_EXTENSIONS), otherwise
/// whatever the sniffer or the pipeline report.
pub async fn ingest<C: RasterCanvas>(
    source: &impl ByteSource,
    request: &CropRequest,
    decoder: &impl ImageDecoder,
    canvas: &C,
    gif_policy: GifPolicy,
) -> Result<IngestOutcome, IngestError> {
    let filename = source.filename();
    if !is_accepted_filename(filename) {
        return Err(IngestError::UnsupportedFile(filename.to_string()));
    }

    let bytes = source.read_bytes().await?;
    let snapshot = SourceBytes::new(Arc::clone(&bytes), filename);

    if is_animated_with(&snapshot, gif_policy).await? {
        info!(file = filename, "animated upload, passing through");
        return Ok(IngestOutcome::Animated {
            filename: filename.to_string(),
            bytes,
        });
    }

    let crop = match request.crop {
        Some(crop) => crop,
        None => {
            let image = load_decoded_image(decoder, &snapshot).await?;
            let crop = full_frame_crop(&image, &request.transform);
            debug!(file = filename, ?crop, "no crop given, using full frame");
            crop
        }
    };

    info!(
        file = filename,
        output = %request.output_filename,
        rotation = request.transform.rotation_degrees,
        flip_h = request.transform.flip.horizontal,
        flip_v = request.transform.flip.vertical,
        "cropping static upload"
    );
    let encoded = crop_rotate_flip(
        decoder,
        canvas,
        &snapshot,
        crop,
        &request.output_filename,
        &request.transform,
    )
    .await?;
    debug!(bytes = encoded.buffer.len(), mime = encoded.mime_type, "encoded");

    Ok(IngestOutcome::Cropped(encoded))
}
