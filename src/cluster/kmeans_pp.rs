//! K-means++ seeding with greedy candidate trials.
//!
//! Spreads initial centroids over the data:
//!
//! 1. Choose the first centroid uniformly at random.
//! 2. For every point keep D(x)², its squared distance to the nearest
//!    centroid chosen so far.
//! 3. Draw `trials` candidates with probability proportional to D(x)² and
//!    keep the one that would leave the smallest total Σ D(x)².
//!
//! Plain k-means++ is `trials = 1`. The greedy variant with
//! `2 + floor(ln k)` trials is the one suggested in the conclusion of
//! Arthur & Vassilvitskii (2007), "k-means++: The Advantages of Careful
//! Seeding".

use super::traits::Seeding;
use crate::distance::DistanceFn;
use ndarray::{ArrayView2, ArrayViewMut2};
use rand::prelude::*;

/// Greedy k-means++ seeding.
#[derive(Debug, Clone, Copy)]
pub struct KmeansPlusPlus {
    /// Squared distance used for D(x)².
    distance: DistanceFn,
    /// Candidate draws per centroid.
    trials: usize,
}

impl KmeansPlusPlus {
    /// Create a seeder using `distance` and `trials` candidates per centroid.
    pub fn new(distance: DistanceFn, trials: usize) -> Self {
        Self {
            distance,
            trials: trials.max(1),
        }
    }

    /// Indices of the sample rows chosen as centroids, in selection order.
    pub fn select(&self, sample: ArrayView2<'_, f64>, k: usize, seed: u64) -> Vec<usize> {
        let n = sample.nrows();
        debug_assert!(k >= 1 && n >= k);

        // One seed, two streams: uniform [0, 1) draws and index draws.
        let mut uniform = StdRng::seed_from_u64(seed);
        let mut index = StdRng::seed_from_u64(uniform.random());

        let mut chosen = Vec::with_capacity(k);
        chosen.push(index.random_range(0..n));
        if k == 1 {
            return chosen;
        }

        let dist = self.distance;
        let mut nearest = vec![f64::INFINITY; n];
        let mut cumulative = vec![0.0; n];

        while chosen.len() < k {
            let last = sample.row(chosen[chosen.len() - 1]);
            let mut max = 0.0_f64;
            for (i, point) in sample.rows().into_iter().enumerate() {
                let d = dist(point, last);
                if d < nearest[i] {
                    nearest[i] = d;
                }
                max = max.max(nearest[i]);
            }

            // Distances are scaled by their maximum so the sum cannot
            // overflow even when every D(x)² is close to f64::MAX.
            let total: f64 = if max.is_finite() && max > 0.0 {
                nearest.iter().map(|&d| d / max).sum()
            } else {
                f64::NAN
            };

            // Every point sits on a chosen centroid, or the data is not finite.
            if total.is_nan() || total <= 0.0 {
                tracing::warn!(
                    chosen = chosen.len(),
                    k,
                    "k-means++ has no distance mass left; choosing uniformly"
                );
                chosen.push(index.random_range(0..n));
                continue;
            }

            let mut acc = 0.0;
            for (p, &d) in cumulative.iter_mut().zip(&nearest) {
                acc += d / max / total;
                *p = acc;
            }

            let mut best: Option<(usize, f64)> = None;
            for _ in 0..self.trials {
                let candidate = match draw(&cumulative, &mut uniform) {
                    Some(i) => i,
                    None => index.random_range(0..n),
                };
                let center = sample.row(candidate);
                let cost: f64 = sample
                    .rows()
                    .into_iter()
                    .zip(&nearest)
                    .map(|(point, &d)| dist(point, center).min(d) / max)
                    .sum();
                if best.map_or(true, |(_, c)| cost < c) {
                    best = Some((candidate, cost));
                }
            }
            if let Some((candidate, _)) = best {
                chosen.push(candidate);
            }
        }
        chosen
    }
}

/// Uniform draws tried before [`draw`] gives up on landing inside the
/// cumulative distribution.
const MAX_DRAWS: usize = 64;

/// Index of the first cumulative probability above a uniform draw.
///
/// Rounding can leave the last cumulative value a hair below 1; a draw that
/// lands beyond it is redrawn. After [`MAX_DRAWS`] misses the last index
/// carrying any mass is returned, and `None` when no index carries any.
fn draw(cumulative: &[f64], rng: &mut StdRng) -> Option<usize> {
    for _ in 0..MAX_DRAWS {
        let r: f64 = rng.random();
        let idx = cumulative.partition_point(|&p| p <= r);
        if idx < cumulative.len() {
            return Some(idx);
        }
    }
    (0..cumulative.len()).rev().find(|&i| {
        let below = if i == 0 { 0.0 } else { cumulative[i - 1] };
        cumulative[i] > below
    })
}

impl Seeding for KmeansPlusPlus {
    fn init_centroids(
        &self,
        mut centroids: ArrayViewMut2<'_, f64>,
        sample: ArrayView2<'_, f64>,
        seed: u64,
    ) {
        let chosen = self.select(sample, centroids.nrows(), seed);
        for (c, &idx) in chosen.iter().enumerate() {
            centroids.row_mut(c).assign(&sample.row(idx));
        }
    }
}
