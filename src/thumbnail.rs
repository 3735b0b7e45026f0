//! Scale-and-crop of a raster to an exact target size.
//!
//! Used to prepare watermark stamps and thumbnails from full-resolution
//! photos: the source is scaled by a uniform cover factor (scaling up when
//! needed) and the overshoot is cropped away around the center, so the
//! result is always exactly the requested size with no distortion.

use ::image::imageops::FilterType;
use ::image::{DynamicImage, GenericImageView};

/// Errors that can occur during thumbnail extraction.
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("zero dimension: source {source_width}x{source_height}, target {target_width}x{target_height}")]
    ZeroDimension {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
    },
}

/// Geometry of a cover-scale-then-center-crop operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillGeometry {
    /// Size the source is scaled to before cropping. Covers the target box
    /// on both axes.
    pub scaled_width: u32,
    pub scaled_height: u32,
    /// Top-left corner of the centered crop window inside the scaled image.
    pub crop_x: u32,
    pub crop_y: u32,
}

/// Computes the uniform scale and centered crop window that map a source
/// onto an exact target box.
///
/// The scale factor is `max(target_w/source_w, target_h/source_h)`: the
/// shorter source dimension lands exactly on its target dimension and the
/// other overshoots, so the crop window always has the target's aspect
/// ratio. Sources smaller than the target are scaled up.
pub fn fill_geometry(
    source_width: u32,
    source_height: u32,
    target_width: u32,
    target_height: u32,
) -> Result<FillGeometry, ThumbnailError> {
    if source_width == 0 || source_height == 0 || target_width == 0 || target_height == 0 {
        return Err(ThumbnailError::ZeroDimension {
            source_width,
            source_height,
            target_width,
            target_height,
        });
    }

    let scale = f64::max(
        target_width as f64 / source_width as f64,
        target_height as f64 / source_height as f64,
    );

    // Rounding must never undershoot the target box
    let scaled_width = ((source_width as f64 * scale).round() as u32).max(target_width);
    let scaled_height = ((source_height as f64 * scale).round() as u32).max(target_height);

    Ok(FillGeometry {
        scaled_width,
        scaled_height,
        crop_x: (scaled_width - target_width) / 2,
        crop_y: (scaled_height - target_height) / 2,
    })
}

/// Scales `source` so it covers the target box and crops the centered
/// `target_width x target_height` region out of it.
///
/// The input is borrowed and never mutated; the result is always exactly
/// the requested size.
pub fn scale_and_crop_to_fit(
    source: &DynamicImage,
    target_width: u32,
    target_height: u32,
) -> Result<DynamicImage, ThumbnailError> {
    let (source_width, source_height) = source.dimensions();
    let geometry = fill_geometry(source_width, source_height, target_width, target_height)?;

    let scaled = source.resize_exact(
        geometry.scaled_width,
        geometry.scaled_height,
        FilterType::Lanczos3,
    );

    Ok(scaled.crop_imm(geometry.crop_x, geometry.crop_y, target_width, target_height))
}
