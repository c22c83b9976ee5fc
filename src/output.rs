//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Sniff
//!
//! ```text
//! 001 spinner.webp: animated
//! 002 logo.png: static
//! ```
//!
//! With `--json`, one object per file:
//!
//! ```text
//! [{"file":"spinner.webp","animated":true,"declared_mime_type":"image/webp"}]
//! ```
//!
//! ## Crop / Ingest
//!
//! ```text
//! logo.png → logo-icon.png (image/png, 1482 bytes)
//!     Crop: 120x120 at (10, 4)
//!     Rotate: 90°, flip horizontal
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::imaging::{PixelCropRegion, TransformParams};
use serde::Serialize;

/// One line of `sniff` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SniffReport {
    pub file: String,
    pub animated: bool,
    /// MIME type implied by the file name, not by its content.
    pub declared_mime_type: &'static str,
}

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn verdict(animated: bool) -> &'static str {
    if animated { "animated" } else { "static" }
}

pub fn format_sniff_output(reports: &[SniffReport]) -> Vec<String> {
    reports
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{} {}: {}", format_index(i + 1), r.file, verdict(r.animated)))
        .collect()
}

pub fn print_sniff_output(reports: &[SniffReport]) {
    for line in format_sniff_output(reports) {
        println!("{}", line);
    }
}

/// Human description of a transform, or `None` for the identity.
fn describe_transform(transform: &TransformParams) -> Option<String> {
    let mut parts = Vec::new();
    if transform.rotation_degrees != 0.0 {
        parts.push(format!("{}°", transform.rotation_degrees));
    }
    if transform.flip.horizontal {
        parts.push("flip horizontal".to_string());
    }
    if transform.flip.vertical {
        parts.push("flip vertical".to_string());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

/// Format the result of a crop.
pub fn format_crop_output(
    input: &str,
    output: &str,
    mime_type: &str,
    size: usize,
    crop: Option<&PixelCropRegion>,
    transform: &TransformParams,
) -> Vec<String> {
    let mut lines = vec![format!(
        "{} → {} ({}, {} bytes)",
        input, output, mime_type, size
    )];
    match crop {
        Some(c) => lines.push(format!(
            "    Crop: {}x{} at ({}, {})",
            c.width, c.height, c.x, c.y
        )),
        None => lines.push("    Crop: full frame".to_string()),
    }
    if let Some(desc) = describe_transform(transform) {
        lines.push(format!("    Rotate: {}", desc));
    }
    lines
}

/// Format an animated pass-through.
pub fn format_passthrough_output(input: &str, output: &str, size: usize) -> Vec<String> {
    vec![
        format!("{} → {} ({} bytes)", input, output, size),
        "    Animated: copied unchanged".to_string(),
    ]
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}
