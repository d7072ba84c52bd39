//! Tests with real image files
//!
//! These tests round-trip inputs and results through PNG files to make sure
//! the pipeline works on decoded data, including the saliency cut-out path
//! and RGBA export.
#![cfg(feature = "test")]

use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// Get the path to test resources directory
fn resources_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
}

/// Portrait-like scene: a warm ellipse on a cool, slightly graded backdrop
fn create_and_save_portrait(filename: &str, width: u32, height: u32) -> PathBuf {
    let mut image: RgbImage = ImageBuffer::new(width, height);
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    for (x, y, pixel) in image.enumerate_pixels_mut() {
        let dx = (x as f32 - center_x) / (width as f32 * 0.25);
        let dy = (y as f32 - center_y) / (height as f32 * 0.35);
        *pixel = if dx.hypot(dy) <= 1.0 {
            Rgb([220, 170, 140])
        } else {
            let shade = (y * 40 / height) as u8;
            Rgb([30 + shade, 60 + shade, 150 + shade])
        };
    }

    let path = resources_dir().join(filename);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create resources directory");
    image.save(&path).expect("Failed to save test portrait");
    path
}

/// Coarse saliency output for the portrait: the subject box with colors kept
/// and everything else transparent
fn create_and_save_cutout(source: &RgbImage, filename: &str) -> PathBuf {
    let (width, height) = source.dimensions();
    let (x0, x1) = (width * 2 / 10, width * 8 / 10);
    let (y0, y1) = (height / 10, height * 9 / 10);

    let cutout: RgbaImage = ImageBuffer::from_fn(width, height, |x, y| {
        if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
            let Rgb([r, g, b]) = *source.get_pixel(x, y);
            Rgba([r, g, b, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let path = resources_dir().join(filename);
    std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create resources directory");
    cutout.save(&path).expect("Failed to save test cut-out");
    path
}

#[test]
fn test_refine_loaded_portrait_with_rect() {
    use imageops_cutout::{refine, CompositeMode, RectHint, WHITE};

    let path = create_and_save_portrait("portrait_rect.png", 120, 160);
    let loaded = image::open(&path).expect("Failed to load test portrait");

    let segmentation =
        refine(&loaded, RectHint::new(24, 16, 72, 128).into()).expect("Refinement should succeed");
    assert_eq!(segmentation.mask().dimensions(), (120, 160));

    // Center of the subject kept, corners dropped
    assert_eq!(segmentation.mask().get_pixel(60, 80), &Luma([1]));
    assert_eq!(segmentation.mask().get_pixel(2, 2), &Luma([0]));
    assert_eq!(segmentation.mask().get_pixel(117, 157), &Luma([0]));

    let on_white = segmentation
        .composite(CompositeMode::ReplaceColor(WHITE))
        .expect("Compositing should succeed");
    let output = resources_dir().join("portrait_on_white.png");
    on_white.save(&output).expect("Failed to save composite");

    let reloaded = image::open(&output).expect("Failed to reload composite").to_rgb8();
    assert_eq!(reloaded.get_pixel(2, 2), &WHITE);
    assert_eq!(reloaded.get_pixel(60, 80), &Rgb([220, 170, 140]));
}

#[test]
fn test_refine_loaded_portrait_with_cutout() {
    use imageops_cutout::{refine, Hint};

    let path = create_and_save_portrait("portrait_cutout_source.png", 100, 100);
    let loaded = image::open(&path).expect("Failed to load test portrait");
    let cutout_path = create_and_save_cutout(&loaded.to_rgb8(), "portrait_cutout.png");
    let cutout = image::open(&cutout_path).expect("Failed to load test cut-out");

    let segmentation =
        refine(&loaded, Hint::Cutout(&cutout)).expect("Refinement should succeed");
    assert_eq!(segmentation.mask().get_pixel(50, 50), &Luma([1]));
    assert_eq!(segmentation.mask().get_pixel(5, 50), &Luma([0]));
    // Backdrop inside the cut-out box is not part of the subject
    assert_eq!(segmentation.mask().get_pixel(22, 12), &Luma([0]));
}

#[test]
fn test_transparent_export_survives_png_round_trip() {
    use imageops_cutout::{refine, CompositeMode, RectHint};

    let path = create_and_save_portrait("portrait_transparent_source.png", 90, 120);
    let loaded = image::open(&path).expect("Failed to load test portrait");
    let segmentation =
        refine(&loaded, RectHint::new(18, 12, 54, 96).into()).expect("Refinement should succeed");

    let transparent = segmentation
        .composite(CompositeMode::Transparent)
        .expect("Compositing should succeed");
    assert!(matches!(transparent, DynamicImage::ImageRgba8(_)));

    let output = resources_dir().join("portrait_transparent.png");
    transparent.save(&output).expect("Failed to save transparent export");
    let reloaded = image::open(&output)
        .expect("Failed to reload transparent export")
        .to_rgba8();

    assert_eq!(reloaded.dimensions(), (90, 120));
    for (x, y, pixel) in reloaded.enumerate_pixels() {
        let alpha = pixel.0[3];
        assert!(alpha == 0 || alpha == 255, "alpha {alpha} at ({x}, {y})");
        let expected = if segmentation.mask().get_pixel(x, y).0[0] == 1 { 255 } else { 0 };
        assert_eq!(alpha, expected);
    }
}

#[test]
fn test_mask_export_as_grayscale_png() {
    use imageops_cutout::{mask_to_alpha, refine, RectHint};

    let path = create_and_save_portrait("portrait_mask_source.png", 80, 80);
    let loaded = image::open(&path).expect("Failed to load test portrait");
    let segmentation =
        refine(&loaded, RectHint::new(16, 8, 48, 64).into()).expect("Refinement should succeed");

    let alpha: GrayImage = mask_to_alpha(segmentation.mask());
    let output = resources_dir().join("portrait_mask.png");
    alpha.save(&output).expect("Failed to save mask");

    let reloaded = image::open(&output).expect("Failed to reload mask").to_luma8();
    assert_eq!(reloaded, alpha);
    assert!(reloaded.pixels().all(|Luma([v])| *v == 0 || *v == 255));
}
