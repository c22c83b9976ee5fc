//! The rotate → flip → crop pipeline.
//!
//! These functions combine geometry with the decoder and canvas
//! capabilities. They sequence the steps; the capabilities do the pixel work.
//!
//! ```text
//! bytes ─decode─▶ image ─draw(rotate, flip)─▶ bbox surface ─copy(crop)─▶ output surface ─encode─▶ buffer
//! ```
//!
//! Every step consumes the previous step's output, so a call runs strictly in
//! order. Calls share nothing and may run concurrently.

use super::backend::{DecodedImage, ImageDecoder, IngestError, RasterCanvas, RasterSurface};
use super::geometry::{Transform2D, rotated_bounding_box, to_radians};
use super::params::{EncodedImage, PixelCropRegion, TransformParams};
use super::sniff::ImageMime;
use super::source::ByteSource;

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Read and decode an upload.
pub async fn load_decoded_image(
    decoder: &impl ImageDecoder,
    source: &impl ByteSource,
) -> Result<DecodedImage> {
    let bytes = source.read_bytes().await?;
    decoder.decode(bytes).await
}

/// Surface size for a bounding box. Fractions are truncated, as assigning to
/// `canvas.width` does.
fn surface_size(width: f64, height: f64) -> (u32, u32) {
    (width as u32, height as u32)
}

/// Maps image space onto a `bbox_width`×`bbox_height` surface so the image
/// ends up rotated and flipped about its own center, centered on the surface.
pub fn centered_transform(
    image_width: u32,
    image_height: u32,
    bbox_width: f64,
    bbox_height: f64,
    transform: &TransformParams,
) -> Transform2D {
    let (sx, sy) = transform.flip.scale_factors();
    Transform2D::identity()
        .translate(bbox_width / 2.0, bbox_height / 2.0)
        .rotate(to_radians(transform.rotation_degrees))
        .scale(sx, sy)
        .translate(
            -f64::from(image_width) / 2.0,
            -f64::from(image_height) / 2.0,
        )
}

/// Crop, rotate and flip an upload, re-encoding to the format implied by
/// `output_filename`.
///
/// `crop` is expressed in the space of the rotated, flipped image. Regions
/// reaching past that image are not an error; the overflow is transparent.
///
/// # Errors
/// - [`IngestError::FileRead`] if the source cannot be read
/// - [`IngestError::ImageLoad`] if the bytes do not decode
/// - [`IngestError::ContextUnavailable`] if either surface cannot be allocated
/// - [`IngestError::BlobEncoding`] if the encoder produces nothing
pub async fn crop_rotate_flip<C: RasterCanvas>(
    decoder: &impl ImageDecoder,
    canvas: &C,
    source: &impl ByteSource,
    crop: PixelCropRegion,
    output_filename: &str,
    transform: &TransformParams,
) -> Result<EncodedImage> {
    let image = load_decoded_image(decoder, source).await?;

    let bbox = rotated_bounding_box(
        f64::from(image.width()),
        f64::from(image.height()),
        transform.rotation_degrees,
    );
    let (bbox_w, bbox_h) = surface_size(bbox.width, bbox.height);
    let mut rotated = allocate(canvas, bbox_w, bbox_h)?;
    rotated.draw_image(
        &image,
        &centered_transform(
            image.width(),
            image.height(),
            bbox.width,
            bbox.height,
            transform,
        ),
    );

    let mut output = allocate(canvas, crop.width, crop.height)?;
    output.copy_region(&rotated, &crop);
    drop(rotated);

    let mime = ImageMime::from_filename(output_filename);
    let buffer = output
        .encode(mime)
        .await
        .ok_or(IngestError::BlobEncoding {
            mime: mime.as_str(),
        })?;

    Ok(EncodedImage {
        buffer,
        mime_type: mime.as_str(),
    })
}

fn allocate<C: RasterCanvas>(canvas: &C, width: u32, height: u32) -> Result<C::Surface> {
    canvas
        .allocate(width, height)
        .ok_or(IngestError::ContextUnavailable { width, height })
}

/// Crop covering the whole rotated image, for callers that only rotate/flip.
pub fn full_frame_crop(image: &DecodedImage, transform: &TransformParams) -> PixelCropRegion {
    let bbox = rotated_bounding_box(
        f64::from(image.width()),
        f64::from(image.height()),
        transform.rotation_degrees,
    );
    let (width, height) = surface_size(bbox.width, bbox.height);
    PixelCropRegion::new(0, 0, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::Flip;
    use crate::imaging::source::SourceBytes;
    use image::RgbaImage;

    fn upload() -> SourceBytes {
        SourceBytes::new(vec![0u8; 32], "avatar.png")
    }

    #[tokio::test]
    async fn steps_run_in_order() {
        let backend = MockBackend::decoding(64, 48);
        let crop = PixelCropRegion::new(4, 4, 16, 16);

        let result = crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            crop,
            "out.webp",
            &TransformParams::default(),
        )
        .await
        .unwrap();
        assert_eq!(result.mime_type, "image/webp");
        assert_eq!(result.buffer, vec![0xAB; 4]);

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 6);
        assert_eq!(ops[0], RecordedOp::Decode(32));
        assert_eq!(
            ops[1],
            RecordedOp::Allocate {
                width: 64,
                height: 48
            }
        );
        assert!(matches!(
            ops[2],
            RecordedOp::DrawImage {
                width: 64,
                height: 48,
                ..
            }
        ));
        assert_eq!(
            ops[3],
            RecordedOp::Allocate {
                width: 16,
                height: 16
            }
        );
        assert_eq!(ops[4], RecordedOp::CopyRegion(crop));
        assert_eq!(ops[5], RecordedOp::Encode("image/webp"));
    }

    #[tokio::test]
    async fn quarter_turn_allocates_swapped_surface() {
        let backend = MockBackend::decoding(64, 48);
        let transform = TransformParams {
            rotation_degrees: 90.0,
            flip: Flip::default(),
        };

        crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            PixelCropRegion::new(0, 0, 48, 64),
            "out.png",
            &transform,
        )
        .await
        .unwrap();

        assert_eq!(
            backend.get_operations()[1],
            RecordedOp::Allocate {
                width: 48,
                height: 64
            }
        );
    }

    #[tokio::test]
    async fn first_allocation_failure_is_context_unavailable() {
        let backend = MockBackend::decoding(64, 48).refusing_allocation(1);

        let err = crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            PixelCropRegion::new(0, 0, 8, 8),
            "out.png",
            &TransformParams::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::ContextUnavailable {
                width: 64,
                height: 48
            }
        ));
        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Encode(_))));
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::DrawImage { .. })));
    }

    #[tokio::test]
    async fn second_allocation_failure_is_context_unavailable() {
        let backend = MockBackend::decoding(64, 48).refusing_allocation(2);

        let err = crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            PixelCropRegion::new(0, 0, 8, 8),
            "out.png",
            &TransformParams::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::ContextUnavailable {
                width: 8,
                height: 8
            }
        ));
        let ops = backend.get_operations();
        assert!(!ops.iter().any(|op| matches!(op, RecordedOp::Encode(_))));
    }

    #[tokio::test]
    async fn empty_encoder_output_is_blob_encoding_failure() {
        let backend = MockBackend::decoding(64, 48).with_encoder_output(None);

        let err = crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            PixelCropRegion::new(0, 0, 8, 8),
            "icon.jpeg",
            &TransformParams::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::BlobEncoding { mime: "image/jpeg" }
        ));
    }

    #[tokio::test]
    async fn decode_failure_is_image_load() {
        let backend = MockBackend::decoding(1, 1);
        *backend.decode_result.lock().unwrap() = None;

        let err = crop_rotate_flip(
            &backend,
            &backend,
            &upload(),
            PixelCropRegion::new(0, 0, 8, 8),
            "out.png",
            &TransformParams::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, IngestError::ImageLoad(_)));
        assert_eq!(backend.get_operations().len(), 1);
    }

    #[test]
    fn centered_transform_identity_at_zero() {
        let t = centered_transform(10, 6, 10.0, 6.0, &TransformParams::default());
        assert_eq!(t.apply(3.0, 2.0), (3.0, 2.0));
    }

    #[test]
    fn centered_transform_flip_mirrors_about_center() {
        let transform = TransformParams {
            rotation_degrees: 0.0,
            flip: Flip {
                horizontal: true,
                vertical: false,
            },
        };
        let t = centered_transform(10, 6, 10.0, 6.0, &transform);
        assert_eq!(t.apply(0.0, 1.0), (10.0, 1.0));
    }

    #[test]
    fn full_frame_crop_covers_rotated_image() {
        let image = DecodedImage::new(RgbaImage::new(30, 20));
        let transform = TransformParams {
            rotation_degrees: 270.0,
            flip: Flip::default(),
        };
        assert_eq!(
            full_frame_crop(&image, &transform),
            PixelCropRegion::new(0, 0, 20, 30)
        );
    }
}
