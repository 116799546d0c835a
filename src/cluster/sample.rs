//! Random-sample seeding: k distinct buffered points become the centroids.

use super::traits::Seeding;
use ndarray::{ArrayView2, ArrayViewMut2};
use rand::prelude::*;

/// Seeding by sampling without replacement.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSample;

impl Seeding for RandomSample {
    fn init_centroids(
        &self,
        mut centroids: ArrayViewMut2<'_, f64>,
        sample: ArrayView2<'_, f64>,
        seed: u64,
    ) {
        let k = centroids.nrows();
        let n = sample.nrows();
        debug_assert!(k >= 1 && n >= k);

        // The whole buffer is the sample; centroids are unordered.
        if n == k {
            centroids.assign(&sample);
            return;
        }
        let mut rng = StdRng::seed_from_u64(seed);
        let chosen = rand::seq::index::sample(&mut rng, n, k);
        for (c, idx) in chosen.iter().enumerate() {
            centroids.row_mut(c).assign(&sample.row(idx));
        }
    }
}
