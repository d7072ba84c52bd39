//! End-to-end refinement: estimator, refiner, post-processor.
//!
//! Every call owns its buffers. The result is a [`Segmentation`] bundling the
//! original image, the processed image (background zeroed) and the final
//! binary mask, ready to be handed to the compositor.

use image::{DynamicImage, GenericImageView, Luma, Rgb};
use imageproc::definitions::Image;
use log::debug;

use crate::config::RefineConfig;
use crate::error::Error;
use crate::imageops_cutout::composite::{composite, CompositeBackground, CompositeMode};
use crate::imageops_cutout::grab_cut::{GrabCut, RefineOutcome};
use crate::imageops_cutout::post_process::MaskPostProcessor;
use crate::imageops_cutout::seed::{seed_from_hint, Hint};
use crate::utils::validate_non_empty_image;

/// Result of refining one image
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    original: Image<Rgb<u8>>,
    processed: Image<Rgb<u8>>,
    mask: Image<Luma<u8>>,
    outcome: RefineOutcome,
}

impl Segmentation {
    /// The image the segmentation was computed for
    #[inline]
    pub const fn original(&self) -> &Image<Rgb<u8>> {
        &self.original
    }

    /// The original with every background pixel set to black
    #[inline]
    pub const fn processed(&self) -> &Image<Rgb<u8>> {
        &self.processed
    }

    /// Final binary mask (0 background, 1 foreground)
    #[inline]
    pub const fn mask(&self) -> &Image<Luma<u8>> {
        &self.mask
    }

    #[inline]
    pub const fn outcome(&self) -> RefineOutcome {
        self.outcome
    }

    /// Splits into `(original, processed, mask)`
    pub fn into_parts(self) -> (Image<Rgb<u8>>, Image<Rgb<u8>>, Image<Luma<u8>>) {
        (self.original, self.processed, self.mask)
    }

    /// Renders the segmentation with the given background mode
    pub fn composite(&self, mode: CompositeMode) -> Result<DynamicImage, Error> {
        composite(&self.original, &self.processed, Some(&self.mask), mode)
    }
}

/// Refines a foreground mask for `image` with the default configuration.
///
/// # Examples
///
/// ```no_run
/// use imageops_cutout::{refine, CompositeMode, RectHint, WHITE};
/// use image::DynamicImage;
///
/// # fn example(image: DynamicImage) -> Result<(), Box<dyn std::error::Error>> {
/// let segmentation = refine(&image, RectHint::new(40, 30, 200, 260).into())?;
/// let on_white = segmentation.composite(CompositeMode::ReplaceColor(WHITE))?;
/// let cutout = segmentation.composite(CompositeMode::Transparent)?;
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// See [`refine_with_config`].
pub fn refine(image: &DynamicImage, hint: Hint<'_>) -> Result<Segmentation, Error> {
    refine_with_config(image, hint, &RefineConfig::default())
}

/// Refines a foreground mask for `image`.
///
/// A seed that contains only one class is returned as the final mask without
/// refinement or post-processing.
///
/// # Errors
///
/// * `Error::EmptyImage` - When the image has zero width or height
/// * `Error::InvalidHint` - When the rectangle hint has no area
/// * `Error::DimensionMismatch` - When a cut-out hint differs in size from the image
/// * `Error::InvalidConfig` - When `config` fails validation
pub fn refine_with_config(
    image: &DynamicImage,
    hint: Hint<'_>,
    config: &RefineConfig,
) -> Result<Segmentation, Error> {
    let grab_cut = GrabCut::new(config.grab_cut)?;
    let post_processor = MaskPostProcessor::new(config.post_process)?;

    let (width, height) = image.dimensions();
    validate_non_empty_image(width, height)?;
    let original = image.to_rgb8();

    let mut labels = seed_from_hint((width, height), hint)?;
    let outcome = grab_cut.refine(&original, &mut labels)?;

    let mask = match outcome {
        RefineOutcome::DegenerateSeed => labels.to_binary_mask(),
        RefineOutcome::Refined { .. } => post_processor.process(&labels.to_binary_mask())?,
    };
    debug!("refinement finished: {:?}", outcome);

    let processed = original.apply_mask(&mask)?;
    Ok(Segmentation {
        original,
        processed,
        mask,
        outcome,
    })
}
