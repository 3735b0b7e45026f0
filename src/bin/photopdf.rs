//! Photopdf CLI
//!
//! A command-line interface for assembling photos into a single PDF
//! document, one page per photo, with an optional corner watermark.

use clap::{Parser, ValueEnum};
use photopdf::{
    scale_and_crop_to_fit, PageCompositor, PageSize, SourceImage, WatermarkCorner,
    WatermarkOptions,
};
use std::path::PathBuf;

/// Photopdf - Assemble photos into a single PDF document
#[derive(Parser, Debug)]
#[command(name = "photopdf")]
#[command(version, about, long_about = None)]
struct Args {
    /// Image file(s) to place on pages, in order
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory the PDF is written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Watermark image stamped on every page
    #[arg(short, long)]
    watermark: Option<PathBuf>,

    /// Scale-and-crop the watermark to this exact size first, e.g. 320x320
    #[arg(long, value_parser = parse_size)]
    watermark_size: Option<(u32, u32)>,

    /// Page corner the watermark is anchored to
    #[arg(long, value_enum, default_value_t = CornerArg::BottomRight)]
    watermark_corner: CornerArg,

    /// Margin between the watermark and its corner, in points
    #[arg(long, default_value_t = 10.0)]
    watermark_margin: f32,

    /// Page size for all pages
    #[arg(long, value_enum, default_value_t = PageSizeArg::A4)]
    page_size: PageSizeArg,

    /// Raster resolution used to convert pixel sizes to points
    #[arg(long, default_value_t = 150.0)]
    dpi: f32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageSize {
    fn from(arg: PageSizeArg) -> Self {
        match arg {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::LETTER,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CornerArg {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl From<CornerArg> for WatermarkCorner {
    fn from(arg: CornerArg) -> Self {
        match arg {
            CornerArg::TopLeft => WatermarkCorner::TopLeft,
            CornerArg::TopRight => WatermarkCorner::TopRight,
            CornerArg::BottomLeft => WatermarkCorner::BottomLeft,
            CornerArg::BottomRight => WatermarkCorner::BottomRight,
        }
    }
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width = w.parse().map_err(|_| format!("invalid width '{}'", w))?;
    let height = h.parse().map_err(|_| format!("invalid height '{}'", h))?;
    Ok((width, height))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    // Validate inputs up front so the user sees every missing file at once
    let mut missing = Vec::new();
    for path in &args.images {
        if !path.exists() {
            eprintln!("Error: File not found: {}", path.display());
            missing.push(path.clone());
        }
    }
    if !missing.is_empty() {
        std::process::exit(1);
    }

    let watermark = match &args.watermark {
        Some(path) => {
            let mark = image::open(path)
                .map_err(|e| format!("Failed to load watermark {}: {}", path.display(), e))?;
            let mark = match args.watermark_size {
                Some((width, height)) => scale_and_crop_to_fit(&mark, width, height)?,
                None => mark,
            };
            Some(mark)
        }
        None => None,
    };

    let compositor = PageCompositor::new()
        .with_page_size(args.page_size.into())
        .with_dpi(args.dpi)
        .with_watermark_options(WatermarkOptions {
            corner: args.watermark_corner.into(),
            margin_pt: args.watermark_margin,
        });

    let sources: Vec<SourceImage> = args
        .images
        .iter()
        .map(SourceImage::from_path)
        .collect();

    println!("Composing {} page(s):", sources.len());
    for (i, path) in args.images.iter().enumerate() {
        println!("  [{}] {}", i + 1, path.display());
    }

    match compositor.compose(&args.output_dir, &sources, watermark.as_ref()) {
        Ok(path) => {
            println!("✓ PDF written to {}", path.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Composition failed: {}", e);
            std::process::exit(1);
        }
    }
}
