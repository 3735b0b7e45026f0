//! Photopdf
//!
//! This library assembles an ordered list of photos into a single multi-page
//! PDF document: one page per photo, each scaled to fit the page and
//! centered, with an optional watermark stamped at a fixed corner of every
//! page.

pub mod compositor;
pub mod source;
pub mod thumbnail;

pub use compositor::{
    fit_to_page, CompositionError, PageCompositor, PageSize, WatermarkCorner, WatermarkOptions,
};
pub use source::{DecodedImage, SourceError, SourceImage};
pub use thumbnail::{fill_geometry, scale_and_crop_to_fit, FillGeometry, ThumbnailError};
