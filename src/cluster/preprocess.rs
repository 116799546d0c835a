//! Metric-dependent preprocessing of incoming points.

use crate::config::Settings;
use crate::distance::Metric;
use crate::matrix::{normalize, normalize_rows, standardize, standardize_rows};
use crate::stats::DimensionStats;
use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2};

/// What happens to a point before it is compared with the centroids.
#[derive(Debug, Clone)]
pub enum Preprocess {
    /// Points are used as given.
    Identity,
    /// Points are scaled to unit length (cosine).
    Normalize,
    /// Points are standardized with running per-dimension moments (correlation).
    Standardize(DimensionStats),
}

impl Preprocess {
    pub(crate) fn for_settings(settings: &Settings, dims: usize) -> Self {
        if !settings.normalize {
            return Preprocess::Identity;
        }
        match settings.metric {
            Metric::Euclidean => Preprocess::Identity,
            Metric::Cosine => Preprocess::Normalize,
            Metric::Correlation => Preprocess::Standardize(DimensionStats::new(dims)),
        }
    }

    /// Whether [`apply`](Self::apply) changes anything.
    pub fn is_identity(&self) -> bool {
        matches!(self, Preprocess::Identity)
    }

    /// Record a raw (not yet preprocessed) point.
    pub fn observe(&mut self, x: ArrayView1<'_, f64>) {
        if let Preprocess::Standardize(stats) = self {
            stats.update(x);
        }
    }

    /// Running per-dimension statistics, when standardizing.
    pub fn dimension_stats(&self) -> Option<&DimensionStats> {
        match self {
            Preprocess::Standardize(stats) => Some(stats),
            _ => None,
        }
    }

    /// Preprocess one point in place.
    pub fn apply(&self, x: ArrayViewMut1<'_, f64>) {
        match self {
            Preprocess::Identity => {}
            Preprocess::Normalize => normalize(x),
            Preprocess::Standardize(stats) => standardize(x, stats.moments()),
        }
    }

    /// Preprocess every row in place. Standardization uses one snapshot of
    /// the moments for all rows.
    pub fn apply_rows(&self, m: ArrayViewMut2<'_, f64>) {
        match self {
            Preprocess::Identity => {}
            Preprocess::Normalize => normalize_rows(m),
            Preprocess::Standardize(stats) => standardize_rows(m, stats.moments()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KmeansOptions;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn settings(metric: Metric, normalize: bool) -> Settings {
        KmeansOptions::default()
            .with_metric(metric)
            .with_normalize(normalize)
            .with_seed(0)
            .resolve(1)
            .unwrap()
    }

    #[test]
    fn variant_follows_metric() {
        assert!(Preprocess::for_settings(&settings(Metric::Euclidean, true), 2).is_identity());
        assert!(Preprocess::for_settings(&settings(Metric::Cosine, false), 2).is_identity());
        assert!(matches!(
            Preprocess::for_settings(&settings(Metric::Cosine, true), 2),
            Preprocess::Normalize
        ));
        let p = Preprocess::for_settings(&settings(Metric::Correlation, true), 3);
        assert_eq!(p.dimension_stats().map(|s| s.dims()), Some(3));
    }

    #[test]
    fn standardize_uses_observed_raw_points() {
        let mut p = Preprocess::for_settings(&settings(Metric::Correlation, true), 1);
        for x in [1.0, 2.0, 3.0] {
            p.observe(arr1(&[x]).view());
        }
        let mut x = arr1(&[4.0]);
        p.apply(x.view_mut());
        // mean 2, sample stdev 1
        assert_relative_eq!(x[0], 2.0);

        let mut m = arr2(&[[2.0], [0.0]]);
        p.apply_rows(m.view_mut());
        assert_relative_eq!(m[[0, 0]], 0.0);
        assert_relative_eq!(m[[1, 0]], -2.0);
    }

    #[test]
    fn identity_and_normalize_ignore_observations() {
        let mut p = Preprocess::Normalize;
        p.observe(arr1(&[100.0, 0.0]).view());
        assert!(p.dimension_stats().is_none());
        let mut x = arr1(&[0.0, 2.0]);
        p.apply(x.view_mut());
        assert_eq!(x, arr1(&[0.0, 1.0]));

        let p = Preprocess::Identity;
        let mut x = arr1(&[3.0, 4.0]);
        p.apply(x.view_mut());
        assert_eq!(x, arr1(&[3.0, 4.0]));
    }
}
