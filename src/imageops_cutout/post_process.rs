//! Mask cleanup after graph-cut refinement.
//!
//! The binary cut leaves jagged edges and isolated speckle. The processor
//! runs, in order:
//!
//! 1. Gaussian blur of the mask (default 7x7)
//! 2. re-threshold at the midpoint of the value range
//! 3. one erosion to strip thin spurs
//! 4. dilations (default two) to restore and slightly grow the subject
//! 5. boundary extraction on the cleaned mask, thickened by one dilation
//! 6. connected components with fewer pixels than the area threshold are
//!    discarded and the survivors are refilled solid
//! 7. pixelwise maximum of the filtered mask and the boundary pixels
//!
//! Internally masks use 0/255 so `imageproc`'s morphology applies directly;
//! input and output use 0/1.

use image::Luma;
use imageproc::definitions::Image;
use imageproc::distance_transform::Norm;
use imageproc::filter::separable_filter_equal;
use imageproc::map::{map_colors, map_colors2};
use imageproc::morphology::{dilate, erode};
use imageproc::region_labelling::{connected_components, Connectivity};
use log::debug;

use crate::config::PostProcessConfig;
use crate::error::{ConfigError, Error};
use crate::utils::validate_non_empty_image;

const ON: u8 = 255;
const MIDPOINT: u8 = 127;

/// Deterministic binary-mask cleanup pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct MaskPostProcessor {
    config: PostProcessConfig,
    kernel: Vec<f32>,
}

impl Default for MaskPostProcessor {
    fn default() -> Self {
        let config = PostProcessConfig::default();
        Self {
            kernel: gaussian_kernel(config.blur_kernel),
            config,
        }
    }
}

impl MaskPostProcessor {
    /// Create a new post-processor
    pub fn new(config: PostProcessConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            kernel: gaussian_kernel(config.blur_kernel),
            config,
        })
    }

    #[inline]
    pub const fn config(&self) -> &PostProcessConfig {
        &self.config
    }

    /// Cleans a binary mask (non-zero is foreground) and returns a mask of
    /// 0 and 1 with the same dimensions.
    ///
    /// Not idempotent: one erosion followed by `dilate_iterations` dilations
    /// grows a clean subject by up to `(dilate_iterations - 1) * morph_radius`
    /// pixels, plus `edge_radius` from the boundary union, on every call. Run
    /// it once per refined mask. Only uniform masks large enough to pass the
    /// area filter come back unchanged.
    ///
    /// # Errors
    ///
    /// * `Error::EmptyImage` - When the mask has zero width or height
    pub fn process(&self, mask: &Image<Luma<u8>>) -> Result<Image<Luma<u8>>, Error> {
        let (width, height) = mask.dimensions();
        validate_non_empty_image(width, height)?;

        let scaled = binarize(mask, 0);
        let smoothed = binarize(&separable_filter_equal(&scaled, &self.kernel), MIDPOINT);

        let radius = self.config.morph_radius;
        let mut cleaned = erode(&smoothed, Norm::LInf, radius);
        for _ in 0..self.config.dilate_iterations {
            cleaned = dilate(&cleaned, Norm::LInf, radius);
        }

        let edges = dilate(&boundary(&cleaned), Norm::LInf, self.config.edge_radius);
        let filtered = remove_small_components(&cleaned, self.config.min_component_area);

        // Boundaries of components dropped by area filtering are kept.
        Ok(map_colors2(&filtered, &edges, |Luma([a]), Luma([b])| {
            Luma([u8::from(a.max(b) > 0)])
        }))
    }
}

/// Maps values above `threshold` to 255 and the rest to 0
fn binarize(mask: &Image<Luma<u8>>, threshold: u8) -> Image<Luma<u8>> {
    map_colors(mask, |Luma([v])| Luma([if v > threshold { ON } else { 0 }]))
}

/// Normalized Gaussian kernel of odd length `size`.
///
/// The standard deviation is derived from the size as
/// `0.3 * ((size - 1) / 2 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Foreground pixels that touch the background (morphological gradient)
fn boundary(mask: &Image<Luma<u8>>) -> Image<Luma<u8>> {
    let inner = erode(mask, Norm::LInf, 1);
    map_colors2(mask, &inner, |Luma([m]), Luma([i])| {
        Luma([if m > 0 && i == 0 { ON } else { 0 }])
    })
}

/// Drops 8-connected components smaller than `min_area` pixels and fills
/// the holes of the remaining ones.
fn remove_small_components(mask: &Image<Luma<u8>>, min_area: u32) -> Image<Luma<u8>> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let component_count = labels.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;

    let mut areas = vec![0u32; component_count + 1];
    for Luma([label]) in labels.pixels() {
        areas[*label as usize] += 1;
    }
    let keep: Vec<bool> = areas
        .iter()
        .enumerate()
        .map(|(label, &area)| label != 0 && area >= min_area)
        .collect();

    debug!(
        "post-process kept {} of {} components",
        keep.iter().filter(|&&k| k).count(),
        component_count
    );

    let solid = map_colors(&labels, |Luma([label])| {
        Luma([if keep[label as usize] { ON } else { 0 }])
    });
    fill_holes(&solid)
}

/// Fills background regions that are not 4-connected to the image border
fn fill_holes(mask: &Image<Luma<u8>>) -> Image<Luma<u8>> {
    let (width, height) = mask.dimensions();
    let inverted = map_colors(mask, |Luma([v])| Luma([if v > 0 { 0 } else { ON }]));
    let regions = connected_components(&inverted, Connectivity::Four, Luma([0u8]));

    let region_count = regions.pixels().map(|p| p.0[0]).max().unwrap_or(0) as usize;
    let mut touches_border = vec![false; region_count + 1];
    for (x, y, Luma([region])) in regions.enumerate_pixels() {
        if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
            touches_border[*region as usize] = true;
        }
    }

    map_colors2(mask, &regions, |Luma([v]), Luma([region])| {
        let hole = region != 0 && !touches_border[region as usize];
        Luma([if v > 0 || hole { ON } else { 0 }])
    })
}
