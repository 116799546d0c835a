//! Forgy seeding: random partition, then cluster means.
//!
//! Every buffered point is dropped into a uniformly random cluster and each
//! centroid becomes the mean of its points. Centroids land near the center
//! of the data, which makes this a poor choice for well-separated clusters
//! but a stable one for noisy data.

use super::traits::Seeding;
use ndarray::{ArrayView2, ArrayViewMut2};
use rand::prelude::*;

/// Random-partition seeding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Forgy;

impl Seeding for Forgy {
    fn init_centroids(
        &self,
        mut centroids: ArrayViewMut2<'_, f64>,
        sample: ArrayView2<'_, f64>,
        seed: u64,
    ) {
        let k = centroids.nrows();
        let n = sample.nrows();
        debug_assert!(k >= 1 && n >= k);
        debug_assert_eq!(centroids.ncols(), sample.ncols());

        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = vec![0usize; k];
        centroids.fill(0.0);

        for point in sample.rows() {
            let c = rng.random_range(0..k);
            counts[c] += 1;
            let m = counts[c] as f64;
            centroids
                .row_mut(c)
                .zip_mut_with(&point, |mu, &x| *mu += (x - *mu) / m);
        }

        // Empty cluster: reinitialize randomly
        for (c, &count) in counts.iter().enumerate() {
            if count == 0 {
                let idx = rng.random_range(0..n);
                tracing::debug!(cluster = c, row = idx, "forgy left cluster empty; using a buffered point");
                centroids.row_mut(c).assign(&sample.row(idx));
            }
        }
    }
}
