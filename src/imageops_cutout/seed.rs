//! Initial foreground estimation.
//!
//! A seed [`LabelMask`] is built either from a rectangle around the subject or
//! from a coarse cut-out produced by an external saliency model. Both modes
//! produce only two categories: probable foreground inside the estimate and
//! definite background outside it.

use image::{DynamicImage, GenericImageView};
use log::debug;

use crate::error::Error;
use crate::imageops_cutout::label::{Label, LabelMask};
use crate::utils::{validate_matching_dimensions, validate_non_empty_image};

/// Rectangle assumed to contain the subject
///
/// Coordinates are signed so that hints partially (or entirely) outside the
/// image can be clamped rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectHint {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl RectHint {
    pub const fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamps the rectangle to an image of the given size.
    ///
    /// Returns the half-open pixel ranges `(x0, y0, x1, y1)`; the range is
    /// empty when the rectangle lies entirely outside the image.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidHint` - When width or height is not positive
    pub fn clamp_to(&self, width: u32, height: u32) -> Result<(u32, u32, u32, u32), Error> {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::InvalidHint {
                width: self.width,
                height: self.height,
            });
        }

        let clamp_x = |v: i64| v.clamp(0, i64::from(width)) as u32;
        let clamp_y = |v: i64| v.clamp(0, i64::from(height)) as u32;

        Ok((
            clamp_x(self.x),
            clamp_y(self.y),
            clamp_x(self.x.saturating_add(self.width)),
            clamp_y(self.y.saturating_add(self.height)),
        ))
    }
}

/// Source of the initial foreground estimate
#[derive(Debug, Clone, Copy)]
pub enum Hint<'a> {
    /// Everything inside the rectangle may be foreground
    Rect(RectHint),
    /// Coarse cut-out; any visible non-black pixel may be foreground
    Cutout(&'a DynamicImage),
}

impl From<RectHint> for Hint<'_> {
    fn from(rect: RectHint) -> Self {
        Self::Rect(rect)
    }
}

impl<'a> From<&'a DynamicImage> for Hint<'a> {
    fn from(cutout: &'a DynamicImage) -> Self {
        Self::Cutout(cutout)
    }
}

/// Seeds a label mask from a rectangle hint.
///
/// Pixels inside the clamped rectangle become [`Label::ProbableForeground`],
/// all others [`Label::Background`].
///
/// # Errors
///
/// * `Error::EmptyImage` - When the image size is zero
/// * `Error::InvalidHint` - When the rectangle has no area
pub fn seed_from_rect(dimensions: (u32, u32), rect: RectHint) -> Result<LabelMask, Error> {
    let (width, height) = dimensions;
    validate_non_empty_image(width, height)?;
    let (x0, y0, x1, y1) = rect.clamp_to(width, height)?;

    let mut mask = LabelMask::new(width, height, Label::Background)?;
    for y in y0..y1 {
        for x in x0..x1 {
            mask.set(x, y, Label::ProbableForeground);
        }
    }

    debug!(
        "rect seed ({}, {})..({}, {}) on {}x{}",
        x0, y0, x1, y1, width, height
    );
    Ok(mask)
}

/// Seeds a label mask from a coarse cut-out image.
///
/// The cut-out is reduced to a single intensity channel with alpha merged in,
/// so fully transparent pixels count as zero. Non-zero intensity becomes
/// [`Label::ProbableForeground`] and zero becomes [`Label::Background`].
///
/// # Errors
///
/// * `Error::EmptyImage` - When the image size is zero
/// * `Error::DimensionMismatch` - When the cut-out size differs from the image
pub fn seed_from_cutout(dimensions: (u32, u32), cutout: &DynamicImage) -> Result<LabelMask, Error> {
    let (width, height) = dimensions;
    validate_non_empty_image(width, height)?;
    validate_matching_dimensions(dimensions, cutout.dimensions())?;

    let intensity = cutout.to_luma_alpha8();
    let mut mask = LabelMask::new(width, height, Label::Background)?;
    for (label, pixel) in mask.labels_mut().iter_mut().zip(intensity.pixels()) {
        let [luma, alpha] = pixel.0;
        if luma > 0 && alpha > 0 {
            *label = Label::ProbableForeground;
        }
    }

    debug!(
        "cut-out seed: {} of {} pixels probable foreground",
        mask.category_count(Label::ProbableForeground),
        width as usize * height as usize
    );
    Ok(mask)
}

/// Seeds a label mask from either kind of hint.
pub fn seed_from_hint(dimensions: (u32, u32), hint: Hint<'_>) -> Result<LabelMask, Error> {
    match hint {
        Hint::Rect(rect) => seed_from_rect(dimensions, rect),
        Hint::Cutout(cutout) => seed_from_cutout(dimensions, cutout),
    }
}
