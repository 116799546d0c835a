//! # kstream
//!
//! Incremental (streaming) k-means clustering.
//!
//! An [`IncrKmeans`] accumulator takes data points one at a time and keeps
//! k centroids and per-cluster distance statistics up to date without
//! storing the data. Centroids are either supplied up front or seeded from
//! a buffered sample with Forgy, random sampling or k-means++.
//!
//! ```rust
//! use kstream::{IncrKmeans, KmeansOptions, Metric};
//! use ndarray::arr1;
//!
//! let opts = KmeansOptions::default().with_metric(Metric::Euclidean).with_seed(7);
//! let mut acc = IncrKmeans::new(2, 2, opts).unwrap();
//!
//! // Default initialization buffers k points before seeding.
//! assert!(acc.ingest(arr1(&[0.0, 0.0]).view()).unwrap().is_none());
//! let results = acc.ingest(arr1(&[5.0, 5.0]).view()).unwrap().unwrap();
//! assert_eq!(results.centroids.nrows(), 2);
//! ```

pub mod cluster;
pub mod config;
pub mod distance;
/// Error types used across `kstream`.
pub mod error;
pub mod matrix;
pub mod stats;

pub use cluster::{CentroidSpec, IncrKmeans, Results};
pub use config::{InitMethod, KmeansOptions, Strategy};
pub use distance::Metric;
pub use error::{Error, ErrorKind, Result};
pub use stats::{ClusterStats, DimensionStats};
