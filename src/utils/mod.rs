//! Internal utility functions for imageops-cutout.
//!
//! This module contains validation shared by the pipeline stages.

use crate::error::Error;

/// Validates that an image has non-zero dimensions.
///
/// # Arguments
///
/// * `width` - The width of the image
/// * `height` - The height of the image
///
/// # Returns
///
/// `Ok(())` if the dimensions are valid, otherwise `Error::EmptyImage`
#[inline]
pub fn validate_non_empty_image(width: u32, height: u32) -> Result<(), Error> {
    if width == 0 || height == 0 {
        Err(Error::EmptyImage)
    } else {
        Ok(())
    }
}

/// Validates that a buffer lines up with the image it belongs to.
///
/// # Arguments
///
/// * `expected` - Dimensions of the reference image
/// * `actual` - Dimensions of the buffer being checked
///
/// # Returns
///
/// `Ok(())` if the dimensions match, otherwise `Error::DimensionMismatch`
#[inline]
pub fn validate_matching_dimensions(expected: (u32, u32), actual: (u32, u32)) -> Result<(), Error> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, actual })
    }
}
