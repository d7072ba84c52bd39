//! Tuning parameters for the refinement pipeline.
//!
//! Defaults: five GrabCut iterations per pass, two passes, five Gaussian
//! components per color model, a 7x7 blur and a 500 pixel speckle threshold.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Parameters of the iterative graph-cut refiner
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GrabCutConfig {
    /// Maximum number of model-fit/relabel iterations per pass
    pub iterations: u32,
    /// Number of full passes; each pass re-learns the color models from the
    /// labels left by the previous one
    pub passes: u32,
    /// Gaussian components per color model
    pub components: usize,
    /// Weight of the neighbor smoothness term
    pub gamma: f64,
}

impl Default for GrabCutConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            passes: 2,
            components: 5,
            gamma: 50.0,
        }
    }
}

impl GrabCutConfig {
    /// Weight binding definite pixels to their terminal.
    ///
    /// Larger than the sum of all eight neighbor weights, so a definite pixel
    /// can never be cut away from its own side.
    #[inline]
    pub fn lambda(&self) -> f64 {
        9.0 * self.gamma
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations(self.iterations));
        }
        if self.passes == 0 {
            return Err(ConfigError::ZeroPasses(self.passes));
        }
        if self.components == 0 {
            return Err(ConfigError::ZeroComponents(self.components));
        }
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(ConfigError::InvalidGamma(self.gamma));
        }
        Ok(())
    }
}

/// Parameters of the mask post-processor
///
/// Morphology uses square structuring elements of side `2 * radius + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PostProcessConfig {
    /// Side of the Gaussian smoothing kernel (odd)
    pub blur_kernel: u32,
    /// Radius of the erosion/dilation element
    pub morph_radius: u8,
    /// Dilation passes after the single erosion
    pub dilate_iterations: u32,
    /// Radius used to thicken the extracted boundary
    pub edge_radius: u8,
    /// Components with fewer pixels than this are discarded
    pub min_component_area: u32,
}

impl Default for PostProcessConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 7,
            morph_radius: 1,
            dilate_iterations: 2,
            edge_radius: 1,
            min_component_area: 500,
        }
    }
}

impl PostProcessConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ConfigError::InvalidBlurKernel(self.blur_kernel));
        }
        if self.morph_radius == 0 {
            return Err(ConfigError::ZeroMorphRadius(self.morph_radius));
        }
        if self.edge_radius == 0 {
            return Err(ConfigError::ZeroEdgeRadius(self.edge_radius));
        }
        if self.min_component_area == 0 {
            return Err(ConfigError::ZeroComponentArea(self.min_component_area));
        }
        Ok(())
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RefineConfig {
    pub grab_cut: GrabCutConfig,
    pub post_process: PostProcessConfig,
}

impl RefineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grab_cut.validate()?;
        self.post_process.validate()
    }
}
