use clap::{Parser, Subcommand};
use icon_ingest::imaging::{
    self, ByteSource, FileSource, Flip, GifPolicy, IngestError, PixelCropRegion, RustBackend,
    TransformParams, crop_rotate_flip, is_animated_with, resolve_mime_type,
};
use icon_ingest::ingest::{CropRequest, IngestOutcome, ingest};
use icon_ingest::{config, output};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Rotation and mirroring flags shared by `crop` and `ingest`.
#[derive(clap::Args, Clone)]
struct TransformArgs {
    /// Rotation in degrees, clockwise; any value, not normalized
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    rotate: f64,

    /// Mirror left-right about the image center
    #[arg(long)]
    flip_horizontal: bool,

    /// Mirror top-bottom about the image center
    #[arg(long)]
    flip_vertical: bool,
}

impl TransformArgs {
    fn params(&self) -> TransformParams {
        TransformParams {
            rotation_degrees: self.rotate,
            flip: Flip {
                horizontal: self.flip_horizontal,
                vertical: self.flip_vertical,
            },
        }
    }
}

/// Parse `X,Y,WIDTH,HEIGHT`.
fn parse_crop(value: &str) -> Result<PixelCropRegion, String> {
    let parts: Vec<u32> = value
        .split(',')
        .map(|p| p.trim().parse::<u32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("crop values must be non-negative integers: {e}"))?;
    let &[x, y, width, height] = parts.as_slice() else {
        return Err("expected X,Y,WIDTH,HEIGHT".to_string());
    };
    if width == 0 || height == 0 {
        return Err("crop width and height must be greater than zero".to_string());
    }
    Ok(PixelCropRegion::new(x, y, width, height))
}

#[derive(Parser)]
#[command(name = "icon-ingest")]
#[command(version)]
#[command(about = "Sniff, crop, rotate and flip custom icon uploads")]
#[command(long_about = "\
Sniff, crop, rotate and flip custom icon uploads

Animated uploads (any .gif, or a WebP with an ANIM chunk) are passed through
unchanged. Static uploads are rotated and flipped about their center, cropped
in the rotated image's pixel space, and re-encoded in the format implied by
the output file name (png, jpg/jpeg, gif, webp; anything else becomes JPEG).

Accepted inputs: png, jpg, jpeg, webp, gif.

Run 'icon-ingest gen-config' to generate a documented icon-ingest.toml.")]
struct Cli {
    /// Config file (defaults to ./icon-ingest.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report whether each file is animated
    Sniff {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Print a JSON array instead of text
        #[arg(long)]
        json: bool,
    },
    /// Rotate, flip and crop one static image
    Crop {
        input: PathBuf,

        /// Output file; its extension picks the encoding
        #[arg(long, short)]
        output: PathBuf,

        /// Crop rectangle in rotated-image pixels: X,Y,WIDTH,HEIGHT
        #[arg(long, value_parser = parse_crop)]
        crop: PixelCropRegion,

        #[command(flatten)]
        transform: TransformArgs,
    },
    /// Sniff, then pass through (animated) or crop (static)
    Ingest {
        input: PathBuf,

        /// Directory to write the result into
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Crop rectangle X,Y,WIDTH,HEIGHT (default: the whole rotated image)
        #[arg(long, value_parser = parse_crop)]
        crop: Option<PixelCropRegion>,

        /// Output extension for static uploads (default: the input's)
        #[arg(long)]
        format: Option<String>,

        #[command(flatten)]
        transform: TransformArgs,
    },
    /// Print a stock icon-ingest.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Sniff { files, json } => {
            let (_, gif_policy) = setup(cli.config.as_deref())?;
            let reports = sniff_files(&files, gif_policy).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                output::print_sniff_output(&reports);
            }
        }
        Command::Crop {
            input,
            output: output_path,
            crop,
            transform,
        } => {
            let (backend, _) = setup(cli.config.as_deref())?;
            let lines =
                crop_file(&backend, &input, &output_path, crop, &transform.params()).await?;
            output::print_lines(&lines);
        }
        Command::Ingest {
            input,
            output_dir,
            crop,
            format,
            transform,
        } => {
            let (backend, gif_policy) = setup(cli.config.as_deref())?;
            let output_name = icon_file_name(&input, format.as_deref());
            let mut request = CropRequest::new(&output_name).with_transform(transform.params());
            request.crop = crop;
            let lines = ingest_file(&backend, gif_policy, &input, &output_dir, &request).await?;
            output::print_lines(&lines);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

async fn sniff_files(
    files: &[PathBuf],
    gif_policy: GifPolicy,
) -> Result<Vec<output::SniffReport>, IngestError> {
    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let source = FileSource::new(path);
        let animated = is_animated_with(&source, gif_policy).await?;
        reports.push(output::SniffReport {
            file: path.display().to_string(),
            animated,
            declared_mime_type: resolve_mime_type(source.filename()),
        });
    }
    Ok(reports)
}

/// Crop one file to `output_path`; returns the report lines.
async fn crop_file(
    backend: &RustBackend,
    input: &Path,
    output_path: &Path,
    crop: PixelCropRegion,
    params: &TransformParams,
) -> Result<Vec<String>, Box<dyn Error>> {
    let source = FileSource::new(input);
    let output_name = file_name(output_path);
    let encoded = crop_rotate_flip(backend, backend, &source, crop, &output_name, params).await?;
    std::fs::write(output_path, &encoded.buffer)?;
    Ok(output::format_crop_output(
        &input.display().to_string(),
        &output_path.display().to_string(),
        encoded.mime_type,
        encoded.buffer.len(),
        Some(&crop),
        params,
    ))
}

/// Run the ingestion flow for one file, writing the result into `output_dir`.
async fn ingest_file(
    backend: &RustBackend,
    gif_policy: GifPolicy,
    input: &Path,
    output_dir: &Path,
    request: &CropRequest,
) -> Result<Vec<String>, Box<dyn Error>> {
    let source = FileSource::new(input);
    std::fs::create_dir_all(output_dir)?;
    let lines = match ingest(&source, request, backend, backend, gif_policy).await? {
        IngestOutcome::Animated { filename, bytes } => {
            let target = output_dir.join(&filename);
            std::fs::write(&target, &bytes)?;
            output::format_passthrough_output(
                &input.display().to_string(),
                &target.display().to_string(),
                bytes.len(),
            )
        }
        IngestOutcome::Cropped(encoded) => {
            let target = output_dir.join(&request.output_filename);
            std::fs::write(&target, &encoded.buffer)?;
            output::format_crop_output(
                &input.display().to_string(),
                &target.display().to_string(),
                encoded.mime_type,
                encoded.buffer.len(),
                request.crop.as_ref(),
                &request.transform,
            )
        }
    };
    Ok(lines)
}

/// Resolve config and build the backend it describes.
fn setup(explicit_config: Option<&Path>) -> Result<(RustBackend, GifPolicy), Box<dyn Error>> {
    let cwd = std::env::current_dir()?;
    let config = config::resolve_config(explicit_config, &cwd)?;
    debug!(?config, "resolved config");
    Ok((
        RustBackend::from_config(&config),
        config.sniffer.gif_policy,
    ))
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// `<stem>-icon.<ext>`, keeping the input's extension unless `format` is given.
fn icon_file_name(input: &Path, format: Option<&str>) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    let ext = format.map(str::to_string).unwrap_or_else(|| {
        let name = file_name(input);
        imaging::ImageMime::from_filename(&name)
            .extension()
            .to_string()
    });
    format!("{stem}-icon.{ext}")
}
