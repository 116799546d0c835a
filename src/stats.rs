//! Online statistics (Welford's algorithm).
//!
//! Two accumulators live here:
//!
//! - [`DimensionStats`]: running mean and standard deviation of every input
//!   dimension. Feeds standardization for the correlation metric.
//! - [`ClusterStats`]: per-cluster count, sum, mean and standard deviation
//!   of the squared distances of the points assigned to each cluster.
//!
//! Both use the single-pass update
//!
//! ```text
//! n  ← n + 1
//! δ  ← x - μ
//! μ  ← μ + δ / n
//! M2 ← M2 + δ (x - μ)
//! s  = sqrt(M2 / (n - 1))
//! ```
//!
//! which never accumulates raw sums of squares and so does not lose
//! precision on large or offset data.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Column of the cluster statistics table holding the number of assigned points.
pub const COUNT: usize = 0;
/// Column holding the sum of assigned squared distances.
pub const SUM: usize = 1;
/// Column holding the running mean of assigned squared distances.
pub const MEAN: usize = 2;
/// Column holding the running standard deviation of assigned squared distances.
pub const STDEV: usize = 3;
/// Number of columns in the cluster statistics table.
pub const NSTATS: usize = 4;

/// Running mean and standard deviation for each of `d` dimensions.
#[derive(Debug, Clone)]
pub struct DimensionStats {
    count: u64,
    mean: Array1<f64>,
    m2: Array1<f64>,
    /// `{mean, stdev}` per dimension, refreshed on every update.
    moments: Array2<f64>,
}

impl DimensionStats {
    /// Create an empty accumulator over `dims` dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            count: 0,
            mean: Array1::zeros(dims),
            m2: Array1::zeros(dims),
            moments: Array2::zeros((dims, 2)),
        }
    }

    /// Incorporate one observation.
    pub fn update(&mut self, x: ArrayView1<'_, f64>) {
        debug_assert_eq!(x.len(), self.mean.len());
        self.count += 1;
        let n = self.count as f64;

        for ((mu, m2), &xi) in self.mean.iter_mut().zip(self.m2.iter_mut()).zip(x.iter()) {
            let delta = xi - *mu;
            *mu += delta / n;
            *m2 += delta * (xi - *mu);
        }

        for i in 0..self.dims() {
            let stdev = self.stdev(i);
            let mut row = self.moments.row_mut(i);
            row[0] = self.mean[i];
            row[1] = stdev;
        }
    }

    /// Number of observations seen.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Number of dimensions tracked.
    pub fn dims(&self) -> usize {
        self.mean.len()
    }

    /// Running mean of each dimension.
    pub fn mean(&self) -> ArrayView1<'_, f64> {
        self.mean.view()
    }

    /// Sample standard deviation of dimension `i`; zero until two observations.
    pub fn stdev(&self, i: usize) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2[i] / (self.count - 1) as f64).sqrt()
    }

    /// `d x 2` table of `{mean, stdev}` pairs, one row per dimension.
    pub fn moments(&self) -> ArrayView2<'_, f64> {
        self.moments.view()
    }
}

/// Per-cluster statistics of assigned squared distances.
///
/// Owns the `k x NSTATS` table that is published in
/// [`Results::stats`](crate::Results::stats).
#[derive(Debug, Clone)]
pub struct ClusterStats {
    table: Array2<f64>,
    m2: Array1<f64>,
}

impl ClusterStats {
    /// Empty statistics for `k` clusters.
    pub fn new(k: usize) -> Self {
        Self {
            table: Array2::zeros((k, NSTATS)),
            m2: Array1::zeros(k),
        }
    }

    /// Record that a point at squared distance `dist` was assigned to `cluster`.
    ///
    /// The standard deviation of a cluster holding a single point is `NaN`.
    pub fn update(&mut self, cluster: usize, dist: f64) {
        let mut row = self.table.row_mut(cluster);

        let n = row[COUNT] + 1.0;
        row[COUNT] = n;
        row[SUM] += dist;

        let delta = dist - row[MEAN];
        row[MEAN] += delta / n;
        self.m2[cluster] += delta * (dist - row[MEAN]);

        row[STDEV] = if n < 2.0 {
            f64::NAN
        } else {
            (self.m2[cluster] / (n - 1.0)).sqrt()
        };
    }

    /// Number of points assigned to `cluster` so far.
    pub fn count(&self, cluster: usize) -> f64 {
        self.table[[cluster, COUNT]]
    }

    /// The `k x NSTATS` table.
    pub fn table(&self) -> ArrayView2<'_, f64> {
        self.table.view()
    }
}
