//! Page composition: images onto fixed-size document pages.
//!
//! The compositor lays out one source image per page, scaled to fit the page
//! while preserving aspect ratio and centered on both axes. An optional
//! watermark is stamped unscaled at a fixed corner of every page, drawn after
//! the main image. The finished document is serialized to PDF bytes in
//! memory, so no partially written file can ever be observed on disk.

use crate::source::{DecodedImage, SourceError, SourceImage};
use ::image::GenericImageView;
use printpdf::*;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Raster resolution used to convert pixel sizes to points (1/72 inch).
const DEFAULT_DPI: f32 = 150.0;

/// Distance between the watermark and its page corner, in points.
pub const DEFAULT_WATERMARK_MARGIN_PT: f32 = 10.0;

/// Title embedded in the PDF metadata.
const DOCUMENT_TITLE: &str = "Photo Album";

/// Errors that can occur during page composition.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("no source images provided")]
    EmptyInput,

    #[error("invalid output directory: {0}")]
    InvalidOutputDirectory(PathBuf),

    #[error("source image {index} could not be read: {source}")]
    MissingSource {
        index: usize,
        #[source]
        source: SourceError,
    },

    #[error("failed to create page {index}: {reason}")]
    PageCreationFailed { index: usize, reason: String },

    #[error("failed to serialize document: {0}")]
    SerializationFailed(String),
}

/// Physical page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// ISO A4: 210 × 297 mm.
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    /// US Letter: 8.5 × 11 in.
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }
}

/// Page corner a watermark is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Watermark placement configuration, applied identically to every page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatermarkOptions {
    pub corner: WatermarkCorner,
    pub margin_pt: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        WatermarkOptions {
            corner: WatermarkCorner::BottomRight,
            margin_pt: DEFAULT_WATERMARK_MARGIN_PT,
        }
    }
}

/// Scales an image to fit entirely inside a page, preserving aspect ratio.
///
/// An image relatively taller than the page is pinned to the page height,
/// otherwise to the page width. The returned size never exceeds the page on
/// either axis.
pub fn fit_to_page(width: f32, height: f32, page: PageSize) -> (f32, f32) {
    let r = width / height;
    if r < page.aspect_ratio() {
        (page.height * r, page.height)
    } else {
        (page.width, page.width / r)
    }
}

/// Offsets that center a scaled image on the page. Always non-negative for
/// sizes produced by [`fit_to_page`].
pub fn center_on_page(scaled_width: f32, scaled_height: f32, page: PageSize) -> (f32, f32) {
    (
        (page.width - scaled_width) / 2.0,
        (page.height - scaled_height) / 2.0,
    )
}

/// Lower-left position of an unscaled watermark anchored at a page corner
/// with the given margin, in points from the page's bottom-left origin.
///
/// The position is clamped so the watermark stays inside the page even when
/// it is larger than the margin allows.
pub fn watermark_anchor(
    corner: WatermarkCorner,
    watermark_width: f32,
    watermark_height: f32,
    margin: f32,
    page: PageSize,
) -> (f32, f32) {
    let (x, y) = match corner {
        WatermarkCorner::BottomLeft => (margin, margin),
        WatermarkCorner::BottomRight => (page.width - watermark_width - margin, margin),
        WatermarkCorner::TopLeft => (margin, page.height - watermark_height - margin),
        WatermarkCorner::TopRight => (
            page.width - watermark_width - margin,
            page.height - watermark_height - margin,
        ),
    };

    let max_x = (page.width - watermark_width).max(0.0);
    let max_y = (page.height - watermark_height).max(0.0);
    (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

/// Composes source images into a single multi-page PDF document.
pub struct PageCompositor {
    page_size: PageSize,
    dpi: f32,
    watermark_options: WatermarkOptions,
}

impl Default for PageCompositor {
    fn default() -> Self {
        PageCompositor {
            page_size: PageSize::A4,
            dpi: DEFAULT_DPI,
            watermark_options: WatermarkOptions::default(),
        }
    }
}

impl PageCompositor {
    /// Creates a compositor with A4 pages and the default DPI.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size for all pages of the document.
    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the raster resolution used to convert pixel sizes to points.
    pub fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the watermark corner and margin.
    pub fn with_watermark_options(mut self, options: WatermarkOptions) -> Self {
        self.watermark_options = options;
        self
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn watermark_options(&self) -> WatermarkOptions {
        self.watermark_options
    }

    /// Converts a pixel count to PDF points (1/72 inch) at the compositor DPI.
    fn pixels_to_points(&self, pixels: u32) -> f32 {
        (pixels as f32 / self.dpi) * 72.0
    }

    /// Converts points to millimeters.
    fn points_to_mm(points: f32) -> f32 {
        points * 0.352778
    }

    /// Builds the document in memory and serializes it to PDF bytes.
    ///
    /// One page per source, in input order. A failure on any single image
    /// aborts the whole document; nothing is emitted.
    pub fn render(
        &self,
        sources: &[SourceImage],
        watermark: Option<&::image::DynamicImage>,
    ) -> Result<Vec<u8>, CompositionError> {
        if sources.is_empty() {
            return Err(CompositionError::EmptyInput);
        }

        let page_width = Mm(Self::points_to_mm(self.page_size.width));
        let page_height = Mm(Self::points_to_mm(self.page_size.height));

        let (doc, first_page, first_layer) =
            PdfDocument::new(DOCUMENT_TITLE, page_width, page_height, "Layer 1");

        let mut page = (first_page, first_layer);
        for (index, source) in sources.iter().enumerate() {
            let decoded = source
                .decode()
                .map_err(|source| CompositionError::MissingSource { index, source })?;

            if index > 0 {
                page = doc.add_page(page_width, page_height, "Layer 1");
            }

            log::debug!(
                "page {}: source {}x{} px",
                index + 1,
                decoded.width(),
                decoded.height()
            );
            self.draw_page(&doc, page.0, page.1, &decoded, watermark, index)?;
        }

        let mut buf = Vec::new();
        doc.save(&mut BufWriter::new(&mut buf))
            .map_err(|e| CompositionError::SerializationFailed(e.to_string()))?;

        Ok(buf)
    }

    /// Builds the document and writes it to a uniquely named file in
    /// `output_dir`, returning the absolute path.
    ///
    /// Serialization happens fully in memory before the file is created; a
    /// failed write removes the file before the error is returned, so no
    /// partially-valid output is ever left behind.
    pub fn compose(
        &self,
        output_dir: &Path,
        sources: &[SourceImage],
        watermark: Option<&::image::DynamicImage>,
    ) -> Result<PathBuf, CompositionError> {
        let dir = output_dir
            .canonicalize()
            .map_err(|_| CompositionError::InvalidOutputDirectory(output_dir.to_path_buf()))?;
        if !dir.is_dir() {
            return Err(CompositionError::InvalidOutputDirectory(
                output_dir.to_path_buf(),
            ));
        }

        let bytes = self.render(sources, watermark)?;

        let path = dir.join(unique_file_name());
        if let Err(e) = std::fs::write(&path, &bytes) {
            let _ = std::fs::remove_file(&path);
            return Err(CompositionError::SerializationFailed(e.to_string()));
        }

        log::info!("wrote {} page(s) to {}", sources.len(), path.display());
        Ok(path)
    }

    /// Draws one page: the scaled, centered image, then the watermark on top.
    fn draw_page(
        &self,
        doc: &PdfDocumentReference,
        page_idx: PdfPageIndex,
        layer_idx: PdfLayerIndex,
        decoded: &DecodedImage,
        watermark: Option<&::image::DynamicImage>,
        index: usize,
    ) -> Result<(), CompositionError> {
        let (scaled_width, scaled_height) = fit_to_page(
            decoded.width() as f32,
            decoded.height() as f32,
            self.page_size,
        );
        if !scaled_width.is_finite()
            || !scaled_height.is_finite()
            || scaled_width <= 0.0
            || scaled_height <= 0.0
        {
            return Err(CompositionError::PageCreationFailed {
                index,
                reason: format!(
                    "degenerate page geometry: scaled image {}x{} pt on {}x{} pt page",
                    scaled_width, scaled_height, self.page_size.width, self.page_size.height
                ),
            });
        }

        let (offset_x, offset_y) = center_on_page(scaled_width, scaled_height, self.page_size);

        let layer = doc.get_page(page_idx).get_layer(layer_idx);
        self.place_image(
            layer.clone(),
            decoded.as_raster(),
            offset_x,
            offset_y,
            scaled_width,
            scaled_height,
        );

        if let Some(mark) = watermark {
            let (mark_px_w, mark_px_h) = mark.dimensions();
            let mark_width = self.pixels_to_points(mark_px_w);
            let mark_height = self.pixels_to_points(mark_px_h);
            let (mark_x, mark_y) = watermark_anchor(
                self.watermark_options.corner,
                mark_width,
                mark_height,
                self.watermark_options.margin_pt,
                self.page_size,
            );
            self.place_image(layer, mark, mark_x, mark_y, mark_width, mark_height);
        }

        Ok(())
    }

    /// Embeds a raster on a layer at the given position and size in points.
    fn place_image(
        &self,
        layer: PdfLayerReference,
        raster: &::image::DynamicImage,
        x_pt: f32,
        y_pt: f32,
        width_pt: f32,
        height_pt: f32,
    ) {
        // printpdf's embedded-image path expects plain RGB
        let rgb = ::image::DynamicImage::ImageRgb8(raster.to_rgb8());
        let (px_width, px_height) = rgb.dimensions();

        let natural_width = self.pixels_to_points(px_width);
        let natural_height = self.pixels_to_points(px_height);

        let pdf_image = Image::from_dynamic_image(&rgb);
        pdf_image.add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(Self::points_to_mm(x_pt))),
                translate_y: Some(Mm(Self::points_to_mm(y_pt))),
                scale_x: Some(width_pt / natural_width),
                scale_y: Some(height_pt / natural_height),
                dpi: Some(self.dpi),
                ..Default::default()
            },
        );
    }
}

/// Builds a file name that cannot collide with concurrent invocations:
/// wall-clock millis, process id, and a process-local sequence number.
fn unique_file_name() -> String {
    static SEQUENCE: AtomicU64 = AtomicU64::new(0);

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed);

    format!("photopdf-{}-{}-{}.pdf", millis, std::process::id(), seq)
}
