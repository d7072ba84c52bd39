use thiserror::Error;

/// Error type for cutout operations
///
/// Every variant is a local, recoverable condition. The pipeline is
/// deterministic, so a failed call can be retried with corrected input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The rectangle hint has no area
    ///
    /// Returned when the hint's width or height is zero or negative.
    /// Hints that merely extend past the image bounds are clamped instead.
    #[error("Invalid rectangle hint: width ({width}) and height ({height}) must be positive")]
    InvalidHint { width: i64, height: i64 },

    /// Compositing was requested before a final mask was computed
    #[error("No final mask has been computed for this image")]
    MissingMask,

    /// Image, mask or cut-out dimensions do not match
    ///
    /// This error occurs when a buffer that must line up with the source
    /// image has a different size.
    #[error("Image dimensions mismatch: expected {expected:?}, actual {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The input image has zero width or height
    #[error("Image dimensions must be non-zero")]
    EmptyImage,

    /// A tuning parameter is out of range
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),
}

/// Error type for configuration validation
///
/// Each variant names the tunable that was rejected together with the
/// offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Iteration count per pass must be at least 1
    #[error("GrabCut iterations must be at least 1, got {0}")]
    ZeroIterations(u32),

    /// Pass count must be at least 1
    #[error("GrabCut passes must be at least 1, got {0}")]
    ZeroPasses(u32),

    /// Each color model needs at least one component
    #[error("Color model components must be at least 1, got {0}")]
    ZeroComponents(usize),

    /// Smoothness weight must be finite and positive
    #[error("Smoothness weight gamma must be finite and positive, got {0}")]
    InvalidGamma(f64),

    /// Blur kernel must be odd and non-zero
    #[error("Blur kernel size must be odd and non-zero, got {0}")]
    InvalidBlurKernel(u32),

    /// Morphology radius must be non-zero
    #[error("Morphology radius must be at least 1, got {0}")]
    ZeroMorphRadius(u8),

    /// Edge dilation radius must be non-zero
    #[error("Edge dilation radius must be at least 1, got {0}")]
    ZeroEdgeRadius(u8),

    /// Component area threshold must be non-zero
    #[error("Minimum component area must be at least 1, got {0}")]
    ZeroComponentArea(u32),
}
