//! Gaussian mixture color model.
//!
//! Each model holds a fixed number of full-covariance RGB components. Models
//! are rebuilt from scratch on every refinement iteration and never persisted.
//!
//! Initial component assignment comes from a deterministic k-means (farthest
//! point seeding followed by Lloyd iterations), so identical inputs always
//! produce identical masks.

use itertools::Itertools;

/// RGB color in `f64` components
pub type Color = [f64; 3];

type Matrix = [[f64; 3]; 3];

/// Added to the covariance diagonal when a component collapses to a plane,
/// line or single color
const SINGULAR_VARIANCE: f64 = 0.01;

const KMEANS_ITERATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
struct Component {
    weight: f64,
    mean: Color,
    inverse: Matrix,
    /// `-0.5 * ln(det(covariance))`
    log_norm: f64,
}

impl Component {
    const EMPTY: Self = Self {
        weight: 0.0,
        mean: [0.0; 3],
        inverse: [[0.0; 3]; 3],
        log_norm: 0.0,
    };

    #[inline]
    fn is_empty(&self) -> bool {
        self.weight <= 0.0
    }

    /// Log density without the `(2π)^{-3/2}` constant
    #[inline]
    fn log_density(&self, color: &Color) -> f64 {
        let d = [
            color[0] - self.mean[0],
            color[1] - self.mean[1],
            color[2] - self.mean[2],
        ];
        let mut mahalanobis = 0.0;
        for (i, row) in self.inverse.iter().enumerate() {
            mahalanobis += d[i] * (row[0] * d[0] + row[1] * d[1] + row[2] * d[2]);
        }
        self.log_norm - 0.5 * mahalanobis
    }
}

/// Mixture of Gaussian components fit over a set of colors
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianMixture {
    components: Vec<Component>,
}

impl GaussianMixture {
    /// Fits a model with `k` components, seeding component membership with
    /// k-means. Returns `None` when there are no samples.
    pub fn fit(samples: &[Color], k: usize) -> Option<Self> {
        if samples.is_empty() || k == 0 {
            return None;
        }
        let assignment = kmeans(samples, k);
        Self::learn(samples, &assignment, k)
    }

    /// Estimates component weights, means and covariances from samples whose
    /// component membership is already known.
    ///
    /// Returns `None` when there are no samples.
    pub fn learn(samples: &[Color], assignment: &[usize], k: usize) -> Option<Self> {
        if samples.is_empty() || k == 0 {
            return None;
        }

        let mut counts = vec![0usize; k];
        let mut sums = vec![[0.0f64; 3]; k];
        let mut products = vec![[[0.0f64; 3]; 3]; k];

        for (color, &component) in samples.iter().zip(assignment) {
            let component = component.min(k - 1);
            counts[component] += 1;
            for i in 0..3 {
                sums[component][i] += color[i];
                for j in 0..3 {
                    products[component][i][j] += color[i] * color[j];
                }
            }
        }

        let total = samples.len() as f64;
        let components = (0..k)
            .map(|c| {
                if counts[c] == 0 {
                    return Component::EMPTY;
                }
                let n = counts[c] as f64;
                let mean = [sums[c][0] / n, sums[c][1] / n, sums[c][2] / n];
                let mut covariance = [[0.0; 3]; 3];
                for i in 0..3 {
                    for j in 0..3 {
                        covariance[i][j] = products[c][i][j] / n - mean[i] * mean[j];
                    }
                }
                let (inverse, determinant) = regularized_inverse(covariance);
                Component {
                    weight: n / total,
                    mean,
                    inverse,
                    log_norm: -0.5 * determinant.ln(),
                }
            })
            .collect();

        Some(Self { components })
    }

    /// Number of component slots, including empty ones
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Component::is_empty)
    }

    /// Index of the component most likely to have produced `color`
    pub fn component_of(&self, color: &Color) -> usize {
        self.components
            .iter()
            .map(|component| {
                if component.is_empty() {
                    f64::NEG_INFINITY
                } else {
                    component.log_density(color)
                }
            })
            .position_max_by(f64::total_cmp)
            .unwrap_or(0)
    }

    /// `-ln p(color)` under the whole mixture
    pub fn neg_log_likelihood(&self, color: &Color) -> f64 {
        let terms = self
            .components
            .iter()
            .filter(|component| !component.is_empty())
            .map(|component| component.weight.ln() + component.log_density(color))
            .collect::<Vec<_>>();

        let max = terms.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return f64::MAX;
        }
        let sum: f64 = terms.iter().map(|t| (t - max).exp()).sum();
        -(max + sum.ln())
    }
}

/// Inverts a covariance matrix, regularizing it first if it is singular.
///
/// Returns the inverse and the determinant of the (possibly regularized)
/// covariance.
fn regularized_inverse(mut covariance: Matrix) -> (Matrix, f64) {
    let mut det = determinant(&covariance);
    if det <= f64::EPSILON {
        for (i, row) in covariance.iter_mut().enumerate() {
            row[i] += SINGULAR_VARIANCE;
        }
        det = determinant(&covariance);
    }
    if det <= f64::EPSILON {
        // Fall back to the diagonal alone.
        let diagonal = [
            covariance[0][0].max(SINGULAR_VARIANCE),
            covariance[1][1].max(SINGULAR_VARIANCE),
            covariance[2][2].max(SINGULAR_VARIANCE),
        ];
        covariance = [
            [diagonal[0], 0.0, 0.0],
            [0.0, diagonal[1], 0.0],
            [0.0, 0.0, diagonal[2]],
        ];
        det = diagonal[0] * diagonal[1] * diagonal[2];
    }

    let c = &covariance;
    let inverse = [
        [
            (c[1][1] * c[2][2] - c[1][2] * c[2][1]) / det,
            (c[0][2] * c[2][1] - c[0][1] * c[2][2]) / det,
            (c[0][1] * c[1][2] - c[0][2] * c[1][1]) / det,
        ],
        [
            (c[1][2] * c[2][0] - c[1][0] * c[2][2]) / det,
            (c[0][0] * c[2][2] - c[0][2] * c[2][0]) / det,
            (c[0][2] * c[1][0] - c[0][0] * c[1][2]) / det,
        ],
        [
            (c[1][0] * c[2][1] - c[1][1] * c[2][0]) / det,
            (c[0][1] * c[2][0] - c[0][0] * c[2][1]) / det,
            (c[0][0] * c[1][1] - c[0][1] * c[1][0]) / det,
        ],
    ];
    (inverse, det)
}

#[inline]
fn determinant(c: &Matrix) -> f64 {
    c[0][0] * (c[1][1] * c[2][2] - c[1][2] * c[2][1])
        - c[0][1] * (c[1][0] * c[2][2] - c[1][2] * c[2][0])
        + c[0][2] * (c[1][0] * c[2][1] - c[1][1] * c[2][0])
}

#[inline]
fn squared_distance(a: &Color, b: &Color) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

#[inline]
fn nearest_center(centers: &[Color], color: &Color) -> usize {
    centers
        .iter()
        .map(|center| squared_distance(center, color))
        .position_min_by(f64::total_cmp)
        .unwrap_or(0)
}

/// Picks `k` starting centers: the sample nearest the mean, then repeatedly
/// the sample farthest from every center chosen so far.
fn farthest_point_centers(samples: &[Color], k: usize) -> Vec<Color> {
    let n = samples.len() as f64;
    let mean = samples.iter().fold([0.0; 3], |acc, c| {
        [acc[0] + c[0] / n, acc[1] + c[1] / n, acc[2] + c[2] / n]
    });

    let first = nearest_center(samples, &mean);
    let mut centers = Vec::with_capacity(k);
    centers.push(samples[first]);

    let mut min_distance: Vec<f64> = samples
        .iter()
        .map(|s| squared_distance(s, &samples[first]))
        .collect();

    while centers.len() < k {
        let next = min_distance
            .iter()
            .position_max_by(|a, b| a.total_cmp(b))
            .unwrap_or(0);
        let center = samples[next];
        centers.push(center);
        for (distance, sample) in min_distance.iter_mut().zip(samples) {
            *distance = distance.min(squared_distance(sample, &center));
        }
    }
    centers
}

/// Deterministic k-means returning the cluster index of each sample.
fn kmeans(samples: &[Color], k: usize) -> Vec<usize> {
    let mut centers = farthest_point_centers(samples, k);
    let mut labels = vec![0usize; samples.len()];

    for iteration in 0..KMEANS_ITERATIONS {
        let mut changed = false;
        for (label, sample) in labels.iter_mut().zip(samples) {
            let nearest = nearest_center(&centers, sample);
            if nearest != *label {
                *label = nearest;
                changed = true;
            }
        }
        if !changed && iteration > 0 {
            break;
        }

        let mut sums = vec![[0.0f64; 3]; k];
        let mut counts = vec![0usize; k];
        for (&label, sample) in labels.iter().zip(samples) {
            counts[label] += 1;
            for i in 0..3 {
                sums[label][i] += sample[i];
            }
        }
        for ((center, sum), &count) in centers.iter_mut().zip(&sums).zip(&counts) {
            if count > 0 {
                let n = count as f64;
                *center = [sum[0] / n, sum[1] / n, sum[2] / n];
            }
        }
    }
    labels
}
