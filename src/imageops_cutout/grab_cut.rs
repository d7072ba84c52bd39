//! Iterative graph-cut refinement (GrabCut).
//!
//! Starting from a seed [`LabelMask`], each iteration
//!
//! 1. assigns every pixel to the most likely component of its class model,
//! 2. re-learns the foreground and background [`GaussianMixture`]s,
//! 3. builds an 8-connected pixel graph whose terminal links carry the
//!    color likelihood (data term) and whose neighbor links carry a
//!    contrast-sensitive smoothness term,
//! 4. relabels every probable pixel by the side of the minimum cut it falls on.
//!
//! Definite labels are never changed. The energy being minimized is
//!
//! ```text
//! E = Σ_i -ln p(c_i | model(label_i)) + Σ_{i~j, label_i≠label_j} γ/dist(i,j) · exp(-β‖c_i - c_j‖²)
//! ```
//!
//! Running a second pass re-learns the models from the first pass's labels,
//! which lets the refinement settle further.

use image::Rgb;
use imageproc::definitions::Image;
use itertools::iproduct;
use log::{debug, trace};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::GrabCutConfig;
use crate::error::{ConfigError, Error};
use crate::imageops_cutout::gmm::{Color, GaussianMixture};
use crate::imageops_cutout::label::{Label, LabelMask};
use crate::imageops_cutout::max_flow::FlowGraph;
use crate::utils::validate_matching_dimensions;

/// How a refinement run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineOutcome {
    /// Models were fit and the labels were refined
    Refined {
        /// Iterations actually run across all passes
        iterations: u32,
        /// Passes started; each re-fits both models from the current labels
        passes: u32,
    },
    /// The seed held a single class, so there was nothing to separate and
    /// the labels were returned untouched
    DegenerateSeed,
}

/// Iterative energy-minimization refiner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GrabCut {
    config: GrabCutConfig,
}

impl GrabCut {
    /// Create a new refiner
    pub fn new(config: GrabCutConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub const fn config(&self) -> &GrabCutConfig {
        &self.config
    }

    /// Refines `labels` in place against `image`.
    ///
    /// # Errors
    ///
    /// * `Error::DimensionMismatch` - When the label mask and image differ in size
    pub fn refine(
        &self,
        image: &Image<Rgb<u8>>,
        labels: &mut LabelMask,
    ) -> Result<RefineOutcome, Error> {
        validate_matching_dimensions(image.dimensions(), labels.dimensions())?;

        if labels.is_degenerate() {
            debug!("degenerate seed, skipping refinement");
            return Ok(RefineOutcome::DegenerateSeed);
        }

        let colors: Vec<Color> = image
            .pixels()
            .map(|Rgb([r, g, b])| [f64::from(*r), f64::from(*g), f64::from(*b)])
            .collect();
        let neighbors = neighbor_links(image, self.config.gamma);
        let lambda = self.config.lambda();
        let k = self.config.components;

        let mut iterations = 0;
        let mut passes = 0;
        'passes: for pass in 0..self.config.passes {
            let Some((mut background, mut foreground)) = initial_models(&colors, labels, k) else {
                break;
            };
            passes += 1;

            for iteration in 0..self.config.iterations {
                if labels.is_degenerate() {
                    debug!("labels collapsed to one class, stopping");
                    break 'passes;
                }

                let Some(models) = relearn_models(&colors, labels, &background, &foreground, k)
                else {
                    break 'passes;
                };
                (background, foreground) = models;

                let mut graph = FlowGraph::new(colors.len(), 2 * (neighbors.len() + colors.len()));
                for (node, (source_weight, sink_weight)) in
                    terminal_weights(&colors, labels.labels(), &background, &foreground, lambda)
                        .into_iter()
                        .enumerate()
                {
                    graph.add_terminal_weights(node, source_weight, sink_weight);
                }
                for &(a, b, weight) in &neighbors {
                    graph.add_edge(a, b, weight);
                }
                let energy = graph.max_flow();

                let mut changed = 0usize;
                for (node, label) in labels.labels_mut().iter_mut().enumerate() {
                    if label.is_fixed() {
                        continue;
                    }
                    let relabeled = if graph.in_source_segment(node) {
                        Label::ProbableForeground
                    } else {
                        Label::ProbableBackground
                    };
                    if relabeled != *label {
                        *label = relabeled;
                        changed += 1;
                    }
                }

                iterations += 1;
                trace!(
                    "grab cut pass {} iteration {}: energy {:.3}, {} labels changed",
                    pass,
                    iteration,
                    energy,
                    changed
                );
                if changed == 0 {
                    break;
                }
            }
            debug!("grab cut pass {} finished after {} total iterations", pass, iterations);
        }

        Ok(RefineOutcome::Refined { iterations, passes })
    }
}

/// Splits the colors into (background, foreground) sample sets.
fn split_by_class<'a>(
    colors: &'a [Color],
    labels: &'a LabelMask,
) -> impl Iterator<Item = (bool, &'a Color)> + 'a {
    labels
        .labels()
        .iter()
        .zip(colors)
        .map(|(label, color)| (label.is_foreground(), color))
}

fn initial_models(
    colors: &[Color],
    labels: &LabelMask,
    k: usize,
) -> Option<(GaussianMixture, GaussianMixture)> {
    let (foreground, background): (Vec<_>, Vec<_>) =
        split_by_class(colors, labels).partition(|(is_foreground, _)| *is_foreground);
    let background: Vec<Color> = background.into_iter().map(|(_, c)| *c).collect();
    let foreground: Vec<Color> = foreground.into_iter().map(|(_, c)| *c).collect();

    Some((
        GaussianMixture::fit(&background, k)?,
        GaussianMixture::fit(&foreground, k)?,
    ))
}

/// Assigns each pixel to its best component and re-learns both models.
fn relearn_models(
    colors: &[Color],
    labels: &LabelMask,
    background: &GaussianMixture,
    foreground: &GaussianMixture,
    k: usize,
) -> Option<(GaussianMixture, GaussianMixture)> {
    let mut background_samples = Vec::new();
    let mut background_components = Vec::new();
    let mut foreground_samples = Vec::new();
    let mut foreground_components = Vec::new();

    for (is_foreground, color) in split_by_class(colors, labels) {
        if is_foreground {
            foreground_components.push(foreground.component_of(color));
            foreground_samples.push(*color);
        } else {
            background_components.push(background.component_of(color));
            background_samples.push(*color);
        }
    }

    Some((
        GaussianMixture::learn(&background_samples, &background_components, k)?,
        GaussianMixture::learn(&foreground_samples, &foreground_components, k)?,
    ))
}

/// Per-pixel (source, sink) weights.
///
/// The source stands for foreground, so the source link of a pixel is cut
/// when it ends up background and carries the background cost.
fn terminal_weights(
    colors: &[Color],
    labels: &[Label],
    background: &GaussianMixture,
    foreground: &GaussianMixture,
    lambda: f64,
) -> Vec<(f64, f64)> {
    let weight = |(color, label): (&Color, &Label)| match label {
        Label::Background => (0.0, lambda),
        Label::Foreground => (lambda, 0.0),
        Label::ProbableBackground | Label::ProbableForeground => (
            background.neg_log_likelihood(color),
            foreground.neg_log_likelihood(color),
        ),
    };

    #[cfg(feature = "rayon")]
    {
        colors.par_iter().zip(labels.par_iter()).map(weight).collect()
    }
    #[cfg(not(feature = "rayon"))]
    {
        colors.iter().zip(labels.iter()).map(weight).collect()
    }
}

#[inline]
fn color_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> f64 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum()
}

/// Offsets of the four "backward" neighbors; together with their mirror
/// images they cover the 8-neighborhood exactly once.
const BACKWARD_NEIGHBORS: [(i64, i64); 4] = [(-1, 0), (-1, -1), (0, -1), (1, -1)];

/// Contrast parameter `β = 1 / (2 · mean(‖c_i - c_j‖²))` over all neighbor pairs
fn contrast_beta(image: &Image<Rgb<u8>>) -> f64 {
    let (width, height) = image.dimensions();
    let mut sum = 0.0;
    for (y, x) in iproduct!(0..height, 0..width) {
        let color = image.get_pixel(x, y);
        for (dx, dy) in BACKWARD_NEIGHBORS {
            if let Some((nx, ny)) = offset(x, y, dx, dy, width, height) {
                sum += color_distance(color, image.get_pixel(nx, ny));
            }
        }
    }

    let (w, h) = (f64::from(width), f64::from(height));
    let pairs = 4.0 * w * h - 3.0 * w - 3.0 * h + 2.0;
    if sum <= f64::EPSILON || pairs <= 0.0 {
        0.0
    } else {
        1.0 / (2.0 * sum / pairs)
    }
}

#[inline]
fn offset(x: u32, y: u32, dx: i64, dy: i64, width: u32, height: u32) -> Option<(u32, u32)> {
    let nx = i64::from(x) + dx;
    let ny = i64::from(y) + dy;
    (nx >= 0 && ny >= 0 && nx < i64::from(width) && ny < i64::from(height))
        .then_some((nx as u32, ny as u32))
}

/// Smoothness links `(node, neighbor, weight)` of the 8-connected grid
fn neighbor_links(image: &Image<Rgb<u8>>, gamma: f64) -> Vec<(usize, usize, f64)> {
    let (width, height) = image.dimensions();
    let beta = contrast_beta(image);
    let diagonal_gamma = gamma / std::f64::consts::SQRT_2;
    let index = |x: u32, y: u32| y as usize * width as usize + x as usize;

    let mut links = Vec::with_capacity(4 * width as usize * height as usize);
    for (y, x) in iproduct!(0..height, 0..width) {
        let color = image.get_pixel(x, y);
        for (dx, dy) in BACKWARD_NEIGHBORS {
            if let Some((nx, ny)) = offset(x, y, dx, dy, width, height) {
                let scale = if dx != 0 && dy != 0 {
                    diagonal_gamma
                } else {
                    gamma
                };
                let weight = scale * (-beta * color_distance(color, image.get_pixel(nx, ny))).exp();
                links.push((index(x, y), index(nx, ny), weight));
            }
        }
    }
    links
}
