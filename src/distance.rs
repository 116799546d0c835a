//! Distance metrics between a data point and a centroid.
//!
//! All metrics are exposed as *squared* distances, which is what the
//! accumulator compares and what it records in the cluster statistics.
//!
//! | Metric | Squared distance | Preprocessing |
//! |--------|------------------|---------------|
//! | [`Metric::Euclidean`] | `Σ (aᵢ - bᵢ)²` | none |
//! | [`Metric::Cosine`] | `(1 - a·b)²` | rows scaled to unit L2 norm |
//! | [`Metric::Correlation`] | `(1 - a·b)²` | rows standardized per dimension |
//!
//! The cosine and correlation forms assume the preprocessing has already
//! been applied (see [`crate::matrix`]); on raw data they are not distances.
//!
//! Inputs are `ndarray` views, so strided and offset vectors (a column of a
//! matrix, a row of a transposed view) are handled without copying.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

/// Signature shared by the squared distance functions.
pub type DistanceFn = fn(ArrayView1<'_, f64>, ArrayView1<'_, f64>) -> f64;

/// Distance metric used for cluster assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Straight-line distance.
    #[default]
    Euclidean,
    /// One minus cosine similarity.
    Cosine,
    /// One minus Pearson correlation (cosine on standardized data).
    Correlation,
}

impl Metric {
    /// Squared distance function for this metric.
    pub fn squared_distance(self) -> DistanceFn {
        match self {
            Metric::Euclidean => squared_euclidean,
            Metric::Cosine => squared_cosine,
            Metric::Correlation => squared_correlation,
        }
    }

    /// Whether incoming data is rescaled before distances are taken.
    pub fn needs_preprocessing(self) -> bool {
        !matches!(self, Metric::Euclidean)
    }

    /// Name as accepted by the options parser.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Euclidean => "euclidean",
            Metric::Cosine => "cosine",
            Metric::Correlation => "correlation",
        }
    }
}

/// Euclidean distance.
pub fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    squared_euclidean(a, b).sqrt()
}

/// Squared Euclidean distance.
pub fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Squared cosine distance of two unit-length vectors.
pub fn squared_cosine(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let d = 1.0 - a.dot(&b);
    d * d
}

/// Squared correlation distance of two standardized vectors.
pub fn squared_correlation(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    // Standardization already removed location and scale, so what is left
    // is the cosine construction.
    squared_cosine(a, b)
}
