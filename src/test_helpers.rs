//! Shared test utilities: synthetic images and container stubs.
//!
//! Everything is generated in memory so tests need no fixture files.

use image::codecs::gif::GifEncoder;
use image::codecs::png::PngEncoder;
use image::{Delay, Frame, ImageEncoder, Rgba, RgbaImage};

// =========================================================================
// Pixel patterns
// =========================================================================

/// Opaque image where every pixel is distinct, so misplaced pixels show up
/// in equality checks. Holds for images up to 256 pixels on each side.
pub fn numbered_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x * 7 + y * 13) % 256) as u8, 255])
    })
}

// =========================================================================
// Encoded buffers
// =========================================================================

/// PNG-encoded [`numbered_image`].
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = numbered_image(width, height);
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    buffer
}

/// GIF with `frames` 4×4 frames.
pub fn animated_gif_bytes(frames: usize) -> Vec<u8> {
    let mut buffer = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut buffer);
        for i in 0..frames {
            let shade = (i * 60 % 256) as u8;
            let img = RgbaImage::from_pixel(4, 4, Rgba([shade, 0, 0, 255]));
            encoder
                .encode_frame(Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(100, 1)))
                .unwrap();
        }
    }
    buffer
}

/// RIFF/WEBP container holding the given `(fourcc, payload)` chunks.
///
/// Only the container is well-formed; payloads are whatever the test needs.
pub fn webp_container(chunks: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut body = b"WEBP".to_vec();
    for (fourcc, payload) in chunks {
        assert_eq!(fourcc.len(), 4, "fourcc must be 4 bytes");
        body.extend_from_slice(fourcc.as_bytes());
        body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        body.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            body.push(0);
        }
    }

    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&(body.len() as u32).to_le_bytes());
    data.extend_from_slice(&body);
    data
}
