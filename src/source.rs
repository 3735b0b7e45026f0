//! Source image inputs for the page compositor.
//!
//! A [`SourceImage`] references an image either by filesystem path or as an
//! in-memory encoded buffer. Decoding is deferred until the compositor asks
//! for it, so building a source list is cheap and never touches the disk.

use ::image::GenericImageView;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while reading or decoding a source image.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("image decode error: {0}")]
    Decode(#[from] ::image::ImageError),

    #[error("image has zero dimension: width={width}, height={height}")]
    EmptyImage { width: u32, height: u32 },
}

/// A reference to an image to be placed on a document page.
///
/// The compositor borrows sources for the duration of a call and never
/// takes ownership of the underlying file or buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceImage {
    /// An image file on disk.
    Path(PathBuf),
    /// An already-loaded encoded image (PNG, JPEG, ...).
    Bytes(Vec<u8>),
}

impl SourceImage {
    /// Creates a source referencing an image file on disk.
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Self {
        SourceImage::Path(path.into())
    }

    /// Creates a source from an encoded image buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        SourceImage::Bytes(bytes)
    }

    /// Reads (if necessary) and decodes the image.
    pub fn decode(&self) -> Result<DecodedImage, SourceError> {
        let raster = match self {
            SourceImage::Path(path) => {
                let bytes = std::fs::read(path)?;
                ::image::load_from_memory(&bytes)?
            }
            SourceImage::Bytes(bytes) => ::image::load_from_memory(bytes)?,
        };
        DecodedImage::new(raster)
    }

    /// Returns the referenced path, if this source is file-backed.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SourceImage::Path(path) => Some(path),
            SourceImage::Bytes(_) => None,
        }
    }
}

/// A decoded raster with its natural pixel dimensions.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    raster: ::image::DynamicImage,
}

impl DecodedImage {
    /// Wraps a decoded raster, rejecting degenerate dimensions.
    pub fn new(raster: ::image::DynamicImage) -> Result<Self, SourceError> {
        let (width, height) = raster.dimensions();
        if width == 0 || height == 0 {
            return Err(SourceError::EmptyImage { width, height });
        }
        Ok(DecodedImage { raster })
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.raster.dimensions().0
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.raster.dimensions().1
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }

    /// Borrows the decoded raster.
    pub fn as_raster(&self) -> &::image::DynamicImage {
        &self.raster
    }

    /// Consumes the wrapper and returns the raster.
    pub fn into_raster(self) -> ::image::DynamicImage {
        self.raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::image::{DynamicImage, ImageOutputFormat, RgbImage};
    use std::io::Cursor;

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            ::image::Rgb([200, 30, 30]),
        ));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageOutputFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_from_bytes() {
        let source = SourceImage::from_bytes(encode_png(8, 4));
        let decoded = source.decode().unwrap();
        assert_eq!(decoded.width(), 8);
        assert_eq!(decoded.height(), 4);
        assert_eq!(decoded.aspect_ratio(), 2.0);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        let source = SourceImage::from_bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert!(matches!(source.decode(), Err(SourceError::Decode(_))));
    }

    #[test]
    fn test_decode_missing_file() {
        let source = SourceImage::from_path("/nonexistent/picture.png");
        assert!(matches!(source.decode(), Err(SourceError::Io(_))));
    }

    #[test]
    fn test_decode_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("img.png");
        std::fs::write(&path, encode_png(5, 7)).unwrap();

        let source = SourceImage::from_path(&path);
        assert_eq!(source.path(), Some(path.as_path()));

        let decoded = source.decode().unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 7));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let raster = DynamicImage::new_rgb8(0, 10);
        assert!(matches!(
            DecodedImage::new(raster),
            Err(SourceError::EmptyImage {
                width: 0,
                height: 10
            })
        ));
    }
}
