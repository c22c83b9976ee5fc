//! Format sniffing: MIME resolution and animated-image detection.
//!
//! Classification re-derives the format from content wherever it matters;
//! the declared MIME type of an upload is never consulted.
//!
//! | Input | Rule | Verdict |
//! |---|---|---|
//! | `*.gif` (any case) | extension only, bytes not read | animated |
//! | `RIFF....WEBP` | linear scan for an `ANIM` tag from offset 12 | animated iff found |
//! | anything else | - | static |

use super::backend::IngestError;
use super::source::ByteSource;
use image::AnimationDecoder;
use image::codecs::gif::GifDecoder;
use serde::{Deserialize, Serialize};
use std::io::Cursor;

/// Extensions the ingestion flow accepts.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Output formats the pipeline can encode to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageMime {
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl ImageMime {
    /// Infer the format from a filename's extension, defaulting to JPEG.
    pub fn from_filename(filename: &str) -> Self {
        match extension(filename)
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("png") => Self::Png,
            Some("gif") => Self::Gif,
            Some("webp") => Self::WebP,
            _ => Self::Jpeg,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    /// Canonical file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }
}

/// Text after the last `.`, if any.
fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

/// MIME type for an output filename.
///
/// ```
/// # use icon_ingest::imaging::resolve_mime_type;
/// assert_eq!(resolve_mime_type("icon.PNG"), "image/png");
/// assert_eq!(resolve_mime_type("icon.bmp"), "image/jpeg");
/// ```
pub fn resolve_mime_type(filename: &str) -> &'static str {
    ImageMime::from_filename(filename).as_str()
}

/// Whether the filename carries one of [`ACCEPTED_EXTENSIONS`].
pub fn is_accepted_filename(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| {
        ACCEPTED_EXTENSIONS
            .iter()
            .any(|accepted| ext.eq_ignore_ascii_case(accepted))
    })
}

fn has_gif_extension(filename: &str) -> bool {
    extension(filename).is_some_and(|ext| ext.eq_ignore_ascii_case("gif"))
}

/// How `.gif` uploads are classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GifPolicy {
    /// Every `.gif` is animated; the bytes are not inspected.
    #[default]
    Extension,
    /// A `.gif` is animated only if it decodes to two or more frames.
    FrameCount,
}

/// Classify an upload as animated using the default [`GifPolicy`].
pub async fn is_animated(source: &impl ByteSource) -> Result<bool, IngestError> {
    is_animated_with(source, GifPolicy::default()).await
}

/// Classify an upload as animated.
///
/// Fails only when the byte read fails, carrying the underlying I/O error.
pub async fn is_animated_with(
    source: &impl ByteSource,
    gif_policy: GifPolicy,
) -> Result<bool, IngestError> {
    if has_gif_extension(source.filename()) {
        return match gif_policy {
            GifPolicy::Extension => Ok(true),
            GifPolicy::FrameCount => {
                let bytes = source.read_bytes().await?;
                Ok(gif_has_multiple_frames(&bytes))
            }
        };
    }

    let bytes = source.read_bytes().await?;
    Ok(is_animated_webp(&bytes))
}

/// `RIFF` at 0, `WEBP` at 8, and an `ANIM` tag somewhere after the header.
///
/// Raw byte scan: chunk lengths are not followed, and the last four bytes
/// are never the start of a match.
pub fn is_animated_webp(data: &[u8]) -> bool {
    if data.len() < 12 || &data[0..4] != b"RIFF" || &data[8..12] != b"WEBP" {
        return false;
    }
    (12..data.len().saturating_sub(4)).any(|i| &data[i..i + 4] == b"ANIM")
}

/// Unparseable data counts as a single frame.
fn gif_has_multiple_frames(data: &[u8]) -> bool {
    let Ok(decoder) = GifDecoder::new(Cursor::new(data)) else {
        return false;
    };
    decoder
        .into_frames()
        .take_while(Result::is_ok)
        .take(2)
        .count()
        > 1
}
