//! Test utilities for imageops-cutout
//!
//! This module provides common fixtures for testing the pipeline stages.
//! It is only compiled when running tests.

#[cfg(test)]
use image::{Luma, Rgb};
#[cfg(test)]
use imageproc::definitions::Image;

#[cfg(test)]
use crate::imageops_cutout::composite::{BLUE, RED};

/// Creates a test RGB image with predefined pixel values for testing.
///
/// This function creates a 2x2 test image with known pixel values:
/// - (0,0): [200, 150, 100]
/// - (1,0): [100, 200, 150]
/// - (0,1): [150, 100, 200]
/// - (1,1): [50, 75, 25]
#[cfg(test)]
pub fn create_test_rgb_image() -> Image<Rgb<u8>> {
    let mut image: Image<Rgb<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgb([200, 150, 100]));
    image.put_pixel(1, 0, Rgb([100, 200, 150]));
    image.put_pixel(0, 1, Rgb([150, 100, 200]));
    image.put_pixel(1, 1, Rgb([50, 75, 25]));
    image
}

/// Creates a `size`x`size` blue image with a red square covering
/// `start..start + side` on both axes.
#[cfg(test)]
pub fn create_square_scene(size: u32, start: u32, side: u32) -> Image<Rgb<u8>> {
    let square = start..start + side;
    Image::from_fn(size, size, |x, y| {
        if square.contains(&x) && square.contains(&y) {
            RED
        } else {
            BLUE
        }
    })
}

/// Creates a `size`x`size` binary mask (0/1) with a square of ones covering
/// `start..start + side` on both axes.
#[cfg(test)]
pub fn create_binary_square(size: u32, start: u32, side: u32) -> Image<Luma<u8>> {
    let square = start..start + side;
    Image::from_fn(size, size, |x, y| {
        Luma([u8::from(square.contains(&x) && square.contains(&y))])
    })
}

/// Raw values of a mask in row-major order
#[cfg(test)]
pub fn mask_values(mask: &Image<Luma<u8>>) -> Vec<u8> {
    mask.as_raw().clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_square_scene_places_square() {
        let image = create_square_scene(10, 2, 3);
        assert_eq!(image.dimensions(), (10, 10));
        assert_eq!(image.get_pixel(2, 2), &RED);
        assert_eq!(image.get_pixel(4, 4), &RED);
        assert_eq!(image.get_pixel(5, 4), &BLUE);
        assert_eq!(image.get_pixel(1, 2), &BLUE);
    }

    #[test]
    fn create_binary_square_counts_ones() {
        let mask = create_binary_square(10, 2, 3);
        assert_eq!(mask_values(&mask).iter().filter(|&&v| v == 1).count(), 9);
    }
}
