//! # imageops-cutout
//!
//! Foreground/background mask refinement for background replacement and
//! transparent-background export.
//!
//! The pipeline runs four stages, each consuming the previous stage's output:
//!
//! - **Initial Estimation**: seeds a label mask from a rectangle around the
//!   subject or from a coarse cut-out produced by a saliency model
//! - **GrabCut Refinement**: alternates Gaussian-mixture color model fitting
//!   and min-cut relabeling, in two full passes
//! - **Mask Post-Processing**: blur and re-threshold, erode/dilate, speckle
//!   removal by component area, boundary retention
//! - **Compositing**: solid-color background replacement or an RGBA image
//!   with the mask as alpha
//!
//! ## Example Usage
//!
//! ```no_run
//! use imageops_cutout::{refine, CompositeMode, Hint, RectHint, BLUE};
//! use image::DynamicImage;
//!
//! # fn example(image: DynamicImage, saliency: DynamicImage) -> Result<(), Box<dyn std::error::Error>> {
//! // Seed from a rectangle
//! let segmentation = refine(&image, RectHint::new(10, 10, 200, 300).into())?;
//! let on_blue = segmentation.composite(CompositeMode::ReplaceColor(BLUE))?;
//!
//! // Seed from an external cut-out of the same size
//! let segmentation = refine(&image, Hint::Cutout(&saliency))?;
//! let transparent = segmentation.composite(CompositeMode::Transparent)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `rayon`: Parallel evaluation of per-pixel color likelihoods
//! - `serde`: Serialization support for the configuration types

mod config;
mod error;
mod imageops_cutout;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{GrabCutConfig, PostProcessConfig, RefineConfig};
pub use error::{ConfigError, Error};
pub use imageops_cutout::composite::{
    composite, mask_to_alpha, CompositeBackground, CompositeMode, BLUE, RED, WHITE,
};
pub use imageops_cutout::gmm::{Color, GaussianMixture};
pub use imageops_cutout::grab_cut::{GrabCut, RefineOutcome};
pub use imageops_cutout::label::{Label, LabelMask};
pub use imageops_cutout::max_flow::FlowGraph;
pub use imageops_cutout::pipeline::{refine, refine_with_config, Segmentation};
pub use imageops_cutout::post_process::MaskPostProcessor;
pub use imageops_cutout::seed::{seed_from_cutout, seed_from_hint, seed_from_rect, Hint, RectHint};

// Re-export imageproc::definitions::Image for convenience
pub use imageproc::definitions::Image;
