//! Nearest-centroid assignment and the online centroid update.

use crate::distance::DistanceFn;
use crate::stats::ClusterStats;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

/// Index of the centroid closest to `x`. Ties go to the lowest index.
pub fn closest_centroid(distance: DistanceFn, centroids: ArrayView2<'_, f64>, x: ArrayView1<'_, f64>) -> usize {
    let mut best_cluster = 0;
    let mut best_dist = f64::INFINITY;
    for (c, centroid) in centroids.rows().into_iter().enumerate() {
        let dist = distance(centroid, x);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    best_cluster
}

/// Move `centroid` towards `x` as the running mean of `n` points.
pub fn update_centroid(mut centroid: ArrayViewMut1<'_, f64>, x: ArrayView1<'_, f64>, n: f64) {
    centroid.zip_mut_with(&x, |c, &xi| *c += (xi - *c) / n);
}

/// Live centroids and their per-cluster statistics.
#[derive(Debug, Clone)]
pub struct Model {
    centroids: Array2<f64>,
    stats: ClusterStats,
    distance: DistanceFn,
}

impl Model {
    /// Model over the given `k x d` centroids. `centroids` must be row-major.
    pub fn new(centroids: Array2<f64>, distance: DistanceFn) -> Self {
        debug_assert!(centroids.is_standard_layout());
        let k = centroids.nrows();
        Self {
            centroids,
            stats: ClusterStats::new(k),
            distance,
        }
    }

    /// Current centroids.
    pub fn centroids(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Mutable access for seeding.
    pub fn centroids_mut(&mut self) -> ArrayViewMut2<'_, f64> {
        self.centroids.view_mut()
    }

    /// Per-cluster statistics.
    pub fn stats(&self) -> &ClusterStats {
        &self.stats
    }

    /// Assign `x` to its closest centroid, update that centroid and its
    /// statistics, and return the cluster index.
    pub fn observe(&mut self, x: ArrayView1<'_, f64>) -> usize {
        let c = closest_centroid(self.distance, self.centroids.view(), x);
        let n = self.stats.count(c) + 1.0;
        update_centroid(self.centroids.row_mut(c), x, n);

        // Distance to the updated position, not the old one.
        let d = (self.distance)(self.centroids.row(c), x);
        self.stats.update(c, d);

        tracing::trace!(cluster = c, distance = d, count = n, "assigned point");
        c
    }

    /// Closest centroid for every row of `points`, written to `out`.
    pub fn predict_rows(&self, points: ArrayView2<'_, f64>, mut out: ArrayViewMut1<'_, usize>) {
        debug_assert_eq!(points.nrows(), out.len());
        for (slot, point) in out.iter_mut().zip(points.rows()) {
            *slot = closest_centroid(self.distance, self.centroids.view(), point);
        }
    }
}
