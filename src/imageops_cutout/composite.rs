use image::{DynamicImage, GenericImageView, Luma, Rgb, Rgba};
use imageproc::{
    definitions::Image,
    map::{map_colors, map_colors2},
};

use crate::error::Error;
use crate::utils::validate_matching_dimensions;

/// Red background preset
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);
/// Blue background preset
pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
/// White background preset
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// How the background of a segmented image is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Paint every background pixel with a solid color (RGB output)
    ReplaceColor(Rgb<u8>),
    /// Keep colors and add an alpha channel from the mask (RGBA output)
    Transparent,
}

/// Trait providing background compositing for RGB images
///
/// All operations return new buffers and never modify the image or the
/// mask. Masks hold 0 (background) and 1 (foreground); any non-zero value
/// is treated as foreground.
pub trait CompositeBackground {
    /// Replaces the background with a solid color
    ///
    /// # Arguments
    ///
    /// * `mask` - Binary mask of the same size
    /// * `color` - Background color
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use imageops_cutout::{CompositeBackground, Image, WHITE};
    /// use image::{Luma, Rgb};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let image: Image<Rgb<u8>> = Image::new(10, 10);
    /// let mask: Image<Luma<u8>> = Image::new(10, 10);
    ///
    /// let on_white = image.replace_background(&mask, WHITE)?;
    /// # Ok(())
    /// # }
    /// ```
    fn replace_background(
        &self,
        mask: &Image<Luma<u8>>,
        color: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>, Error>;

    /// Adds an alpha channel that is opaque on the foreground and fully
    /// transparent on the background
    ///
    /// Colors are copied unchanged, including those of transparent pixels.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    fn transparent_background(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgba<u8>>, Error>;

    /// Zeroes every background pixel, keeping foreground colors
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When image and mask dimensions don't match
    fn apply_mask(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgb<u8>>, Error>;
}

impl CompositeBackground for Image<Rgb<u8>> {
    fn replace_background(
        &self,
        mask: &Image<Luma<u8>>,
        color: Rgb<u8>,
    ) -> Result<Image<Rgb<u8>>, Error> {
        validate_dimensions(self, mask)?;
        Ok(map_colors2(self, mask, |pixel, Luma([m])| {
            if m > 0 {
                pixel
            } else {
                color
            }
        }))
    }

    fn transparent_background(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgba<u8>>, Error> {
        validate_dimensions(self, mask)?;
        let alpha = mask_to_alpha(mask);
        Ok(map_colors2(self, &alpha, |Rgb([red, green, blue]), Luma([a])| {
            Rgba([red, green, blue, a])
        }))
    }

    fn apply_mask(&self, mask: &Image<Luma<u8>>) -> Result<Image<Rgb<u8>>, Error> {
        self.replace_background(mask, Rgb([0, 0, 0]))
    }
}

/// Scales a binary mask to the full alpha range (0 or 255)
pub fn mask_to_alpha(mask: &Image<Luma<u8>>) -> Image<Luma<u8>> {
    map_colors(mask, |Luma([m])| {
        Luma([if m > 0 { u8::MAX } else { 0 }])
    })
}

/// Composites a processed image according to `mode`.
///
/// Color replacement keeps `original` on the foreground; transparent export
/// keeps `processed` and derives alpha from the mask.
///
/// # Errors
///
/// * `Error::MissingMask` - When no final mask has been computed yet
/// * `Error::DimensionMismatch` - When the three buffers differ in size
pub fn composite(
    original: &Image<Rgb<u8>>,
    processed: &Image<Rgb<u8>>,
    mask: Option<&Image<Luma<u8>>>,
    mode: CompositeMode,
) -> Result<DynamicImage, Error> {
    let mask = mask.ok_or(Error::MissingMask)?;
    validate_matching_dimensions(original.dimensions(), processed.dimensions())?;

    match mode {
        CompositeMode::ReplaceColor(color) => original
            .replace_background(mask, color)
            .map(DynamicImage::ImageRgb8),
        CompositeMode::Transparent => processed
            .transparent_background(mask)
            .map(DynamicImage::ImageRgba8),
    }
}

#[inline]
fn validate_dimensions<I>(image: &I, mask: &Image<Luma<u8>>) -> Result<(), Error>
where
    I: GenericImageView,
{
    validate_matching_dimensions(image.dimensions(), mask.dimensions())
}
