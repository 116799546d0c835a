//! Incremental k-means: seeding, assignment and the accumulator.
//!
//! ## Streaming vs Batch
//!
//! Batch k-means (Lloyd) revisits every point on every iteration. The
//! streaming variant here sees each point once: it is assigned to the
//! closest centroid, which then moves to the running mean of its points.
//! Memory is O(k·d) regardless of how many points arrive.
//!
//! ## Initialization
//!
//! Seeding needs more than one point, so the accumulator first buffers a
//! sample (`sample_size >= k` points) and seeds from it:
//!
//! | Strategy | Idea | Notes |
//! |----------|------|-------|
//! | [`Forgy`] | random partition, cluster means | centroids start near the data center |
//! | [`RandomSample`] | k distinct buffered points | cheapest; `sample_size == k` uses the buffer as is |
//! | [`KmeansPlusPlus`] | D(x)²-weighted draws, best of `trials` | default; O(log k)-competitive |
//!
//! Seeded centroids are then refined by replaying the buffer through the
//! normal update, so cluster statistics cover every point.
//!
//! ## Metrics
//!
//! Euclidean works on raw data. Cosine normalizes each point to unit
//! length first; correlation standardizes each dimension with its running
//! mean and standard deviation. See [`crate::distance`].
//!
//! ## Usage
//!
//! ```rust
//! use kstream::cluster::IncrKmeans;
//! use kstream::KmeansOptions;
//! use ndarray::{arr1, arr2};
//!
//! let centroids = arr2(&[[0.0, 0.0], [10.0, 10.0]]);
//! let mut acc = IncrKmeans::with_centroids(centroids.view(), KmeansOptions::default()).unwrap();
//!
//! let results = acc.ingest(arr1(&[9.0, 9.0]).view()).unwrap().unwrap();
//! assert_eq!(results.count(1), 1);
//! assert_eq!(results.centroids.row(1).to_vec(), vec![9.0, 9.0]);
//! ```

mod assign;
mod forgy;
mod incremental;
mod init;
mod kmeans_pp;
mod preprocess;
mod sample;
mod traits;

pub use assign::{closest_centroid, update_centroid, Model};
pub use forgy::Forgy;
pub use incremental::{CentroidSpec, IncrKmeans, Results};
pub use init::{InitController, Progress};
pub use kmeans_pp::KmeansPlusPlus;
pub use preprocess::Preprocess;
pub use sample::RandomSample;
pub use traits::Seeding;
