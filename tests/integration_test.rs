//! Integration tests for the full photo-to-PDF composition workflow.

use image::{DynamicImage, Rgb, RgbImage};
use photopdf::{
    scale_and_crop_to_fit, CompositionError, PageCompositor, PageSize, SourceImage,
    WatermarkCorner, WatermarkOptions,
};
use std::path::PathBuf;
use tempfile::TempDir;

/// Helper that writes a solid-color PNG into `dir` and returns its path.
fn write_test_image(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.path().join(name);
    let img = RgbImage::from_pixel(width, height, Rgb([180, 40, 40]));
    img.save(&path).expect("Failed to write test image");
    path
}

fn entry_count(dir: &TempDir) -> usize {
    std::fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn test_compose_single_image() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let image_path = write_test_image(&input_dir, "photo.png", 40, 30);

    let compositor = PageCompositor::new();
    let sources = vec![SourceImage::from_path(&image_path)];

    let pdf_path = compositor
        .compose(output_dir.path(), &sources, None)
        .expect("Failed to compose PDF");

    assert!(pdf_path.is_absolute());
    assert_eq!(pdf_path.extension().unwrap(), "pdf");

    let bytes = std::fs::read(&pdf_path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
    assert!(bytes.len() > 100);
}

#[test]
fn test_compose_multiple_images_in_order() {
    let input_dir = TempDir::new().unwrap();
    let paths = vec![
        write_test_image(&input_dir, "a.png", 20, 40),
        write_test_image(&input_dir, "b.png", 40, 20),
        write_test_image(&input_dir, "c.png", 30, 30),
    ];
    let sources: Vec<SourceImage> = paths.iter().map(SourceImage::from_path).collect();

    let compositor = PageCompositor::new();
    let one_page = compositor.render(&sources[..1], None).unwrap();
    let three_pages = compositor.render(&sources, None).unwrap();

    assert!(one_page.starts_with(b"%PDF-"));
    assert!(three_pages.starts_with(b"%PDF-"));
    // One embedded image per page
    assert!(three_pages.len() > one_page.len());
}

#[test]
fn test_compose_empty_input_writes_nothing() {
    let output_dir = TempDir::new().unwrap();

    let compositor = PageCompositor::new();
    let result = compositor.compose(output_dir.path(), &[], None);

    assert!(matches!(result, Err(CompositionError::EmptyInput)));
    assert_eq!(entry_count(&output_dir), 0);
}

#[test]
fn test_compose_missing_middle_source_writes_nothing() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    let mut sources: Vec<SourceImage> = (0..5)
        .map(|i| {
            SourceImage::from_path(write_test_image(&input_dir, &format!("{}.png", i), 10, 10))
        })
        .collect();
    sources[2] = SourceImage::from_path(input_dir.path().join("gone.png"));

    let compositor = PageCompositor::new();
    let result = compositor.compose(output_dir.path(), &sources, None);

    assert!(matches!(
        result,
        Err(CompositionError::MissingSource { index: 2, .. })
    ));
    // No partial two-page document is left behind
    assert_eq!(entry_count(&output_dir), 0);
}

#[test]
fn test_compose_invalid_output_directory() {
    let input_dir = TempDir::new().unwrap();
    let image_path = write_test_image(&input_dir, "photo.png", 10, 10);
    let sources = vec![SourceImage::from_path(&image_path)];

    let compositor = PageCompositor::new();
    let result = compositor.compose(&PathBuf::from("/nonexistent/output/dir"), &sources, None);

    assert!(matches!(
        result,
        Err(CompositionError::InvalidOutputDirectory(_))
    ));
}

#[test]
fn test_compose_output_directory_is_a_file() {
    let input_dir = TempDir::new().unwrap();
    let image_path = write_test_image(&input_dir, "photo.png", 10, 10);
    let sources = vec![SourceImage::from_path(&image_path)];

    let compositor = PageCompositor::new();
    let result = compositor.compose(&image_path, &sources, None);

    assert!(matches!(
        result,
        Err(CompositionError::InvalidOutputDirectory(_))
    ));
}

#[test]
fn test_compose_with_watermark_on_every_page() {
    let input_dir = TempDir::new().unwrap();
    let paths = vec![
        write_test_image(&input_dir, "a.png", 60, 40),
        write_test_image(&input_dir, "b.png", 40, 60),
    ];
    let sources: Vec<SourceImage> = paths.iter().map(SourceImage::from_path).collect();
    let mark = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([0, 0, 0])));

    let compositor = PageCompositor::new();
    let plain = compositor.render(&sources, None).unwrap();
    let marked = compositor.render(&sources, Some(&mark)).unwrap();

    assert!(marked.starts_with(b"%PDF-"));
    // The stamp is embedded once per page
    assert!(marked.len() > plain.len());
}

#[test]
fn test_compose_with_prepared_watermark() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let image_path = write_test_image(&input_dir, "photo.png", 120, 90);
    let sources = vec![SourceImage::from_path(&image_path)];

    // Full-resolution logo squeezed into a small stamp first
    let logo = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 200, Rgb([10, 10, 10])));
    let stamp = scale_and_crop_to_fit(&logo, 32, 32).unwrap();

    let compositor = PageCompositor::new()
        .with_page_size(PageSize::LETTER)
        .with_watermark_options(WatermarkOptions {
            corner: WatermarkCorner::TopLeft,
            margin_pt: 18.0,
        });

    let pdf_path = compositor
        .compose(output_dir.path(), &sources, Some(&stamp))
        .expect("Failed to compose PDF");

    let bytes = std::fs::read(&pdf_path).unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[test]
fn test_compose_twice_yields_distinct_files() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let image_path = write_test_image(&input_dir, "photo.png", 10, 10);
    let sources = vec![SourceImage::from_path(&image_path)];

    let compositor = PageCompositor::new();
    let first = compositor
        .compose(output_dir.path(), &sources, None)
        .unwrap();
    let second = compositor
        .compose(output_dir.path(), &sources, None)
        .unwrap();

    assert_ne!(first, second);
    assert!(first.exists());
    assert!(second.exists());
    assert_eq!(entry_count(&output_dir), 2);
}
