//! Distance metrics used by the clustering engine.
//!
//! A metric must be symmetric and return zero exactly when both vectors are
//! componentwise equal. The engine does not check this; refinement relies on
//! it to reach a fixed point.
//!
//! Any closure `Fn(&[f64], &[f64]) -> f64` is also a metric:
//! ```
//! use clustr::ml::clustering::metric::{Euclidean, Metric};
//!
//! let chebyshev = |a: &[f64], b: &[f64]| {
//!     a.iter().zip(b).fold(0.0_f64, |m, (x, y)| m.max((x - y).abs()))
//! };
//! assert_eq!(chebyshev.distance(&[0.0, 0.0], &[3.0, 4.0]), 4.0);
//! assert_eq!(Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
//! ```

/// A distance between two vectors of the same dimension.
pub trait Metric {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;
}

impl<F> Metric for F
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        self(a, b)
    }
}

/// Euclidean norm of the difference. This is the default metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Metric for Euclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b).sqrt()
    }
}

/// Squared Euclidean distance. Orders points the same way as [`Euclidean`]
/// without the square root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredEuclidean;

impl Metric for SquaredEuclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        squared_euclidean(a, b)
    }
}

/// Sum of absolute coordinate differences (L1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Manhattan;

impl Metric for Manhattan {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(&x, &y)| (x - y).abs()).sum()
    }
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .fold(0.0, |acc, (&x, &y)| acc + (x - y).powi(2))
}
