//! Seeding trait.

use ndarray::{ArrayView2, ArrayViewMut2};

/// Strategy that picks initial centroids from a buffered sample.
pub trait Seeding {
    /// Fill the `k x d` `centroids` from the `n x d` `sample` (`n >= k >= 1`).
    ///
    /// Every random choice derives from `seed`, so the same seed and sample
    /// always produce the same centroids.
    fn init_centroids(&self, centroids: ArrayViewMut2<'_, f64>, sample: ArrayView2<'_, f64>, seed: u64);
}
