//! Incremental k-means accumulator.
//!
//! Consumes one point at a time and keeps k centroids plus per-cluster
//! statistics current, without storing the data.
//!
//! # Lifecycle
//!
//! ```text
//! new(k, d)            -> buffering: ingest() returns None until the
//!                         initialization sample is full, then seeds
//! with_centroids(m)    -> steady from the start
//! steady               -> every ingest() assigns the point to the closest
//!                         centroid and moves that centroid to the running
//!                         mean of its points
//! ```
//!
//! # Online Update
//!
//! For the closest centroid `c` with `N` points including the new one:
//!
//! ```text
//! cᵢ ← cᵢ + (xᵢ - cᵢ) / N
//! ```
//!
//! After `N` points `c` equals their mean up to rounding, with no running
//! sums to overflow or cancel.
//!
//! Unlike Lloyd's algorithm, a point is never reassigned once the
//! centroids move; the result depends on arrival order.

use super::assign::Model;
use super::init::{InitController, Progress};
use super::preprocess::Preprocess;
use crate::config::{KmeansOptions, Settings, Strategy};
use crate::distance::Metric;
use crate::error::{Error, Result};
use crate::matrix::{copy_contiguous, copy_vector, owned_copy};
use crate::stats::{DimensionStats, COUNT, MEAN, NSTATS, STDEV, SUM};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2};

/// Snapshot of the clustering state.
#[derive(Debug, Clone, PartialEq)]
pub struct Results {
    /// `k x d` centroids, one per row.
    pub centroids: Array2<f64>,
    /// `k x 4` statistics: count, sum, mean and standard deviation of the
    /// squared distances of the points assigned to each cluster.
    pub stats: Array2<f64>,
}

impl Results {
    fn new(k: usize, dims: usize) -> Self {
        Self {
            centroids: Array2::zeros((k, dims)),
            stats: Array2::zeros((k, NSTATS)),
        }
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    /// Points assigned to `cluster`.
    pub fn count(&self, cluster: usize) -> u64 {
        self.stats[[cluster, COUNT]] as u64
    }

    /// Sum of squared distances assigned to `cluster`.
    pub fn sum(&self, cluster: usize) -> f64 {
        self.stats[[cluster, SUM]]
    }

    /// Mean squared distance of `cluster`.
    pub fn mean(&self, cluster: usize) -> f64 {
        self.stats[[cluster, MEAN]]
    }

    /// Standard deviation of the squared distances of `cluster`; `NaN` below two points.
    pub fn stdev(&self, cluster: usize) -> f64 {
        self.stats[[cluster, STDEV]]
    }
}

/// How the accumulator is constructed.
#[derive(Debug, Clone)]
pub enum CentroidSpec {
    /// Number of clusters and dimensions; centroids are seeded from data.
    Dims {
        /// Number of clusters.
        k: usize,
        /// Number of dimensions.
        d: usize,
    },
    /// Initial `k x d` centroids.
    Centroids(Array2<f64>),
}

/// Streaming k-means accumulator.
///
/// ```rust
/// use kstream::{IncrKmeans, InitMethod, KmeansOptions, Strategy};
/// use ndarray::arr1;
///
/// let opts = KmeansOptions::default()
///     .with_init(InitMethod::new(Strategy::Sample).with_sample_size(2))
///     .with_seed(42);
/// let mut acc = IncrKmeans::new(2, 1, opts).unwrap();
///
/// assert!(acc.ingest(arr1(&[0.0]).view()).unwrap().is_none());
/// let results = acc.ingest(arr1(&[10.0]).view()).unwrap().unwrap();
/// assert_eq!(results.count(0) + results.count(1), 2);
///
/// let labels = acc.predict(ndarray::arr2(&[[1.0], [9.0]]).view()).unwrap().unwrap();
/// assert_ne!(labels[0], labels[1]);
/// ```
#[derive(Debug, Clone)]
pub struct IncrKmeans {
    k: usize,
    dims: usize,
    settings: Settings,
    options: KmeansOptions,
    model: Model,
    prep: Preprocess,
    /// Present until the initial centroids are seeded.
    init: Option<InitController>,
    /// Reused private copy of incoming points that need preprocessing.
    scratch: Option<Array1<f64>>,
    results: Results,
}

impl IncrKmeans {
    /// Accumulator for `k` clusters in `d` dimensions, seeded from the first
    /// `sample_size` points.
    pub fn new(k: usize, d: usize, options: KmeansOptions) -> Result<Self> {
        check_positive("k", k)?;
        check_positive("d", d)?;
        let settings = options.resolve(k)?;
        let model = Model::new(Array2::zeros((k, d)), settings.metric.squared_distance());
        let init = Some(InitController::new(settings.sample_size, d));
        Ok(Self::assemble(k, d, settings, options, model, init))
    }

    /// Accumulator starting from the given `k x d` centroids.
    ///
    /// The matrix is copied; later changes to it have no effect.
    pub fn with_centroids(centroids: ArrayView2<'_, f64>, options: KmeansOptions) -> Result<Self> {
        let (k, d) = centroids.dim();
        check_positive("k", k)?;
        check_positive("d", d)?;
        if centroids.iter().any(|v| !v.is_finite()) {
            return Err(Error::invalid("centroids", "entries must be finite"));
        }
        let settings = options.resolve(k)?;
        let model = Model::new(owned_copy(centroids), settings.metric.squared_distance());

        let mut acc = Self::assemble(k, d, settings, options, model, None);
        acc.publish();
        Ok(acc)
    }

    /// Construct from either form of [`CentroidSpec`].
    pub fn from_spec(spec: CentroidSpec, options: KmeansOptions) -> Result<Self> {
        match spec {
            CentroidSpec::Dims { k, d } => Self::new(k, d, options),
            CentroidSpec::Centroids(m) => Self::with_centroids(m.view(), options),
        }
    }

    fn assemble(
        k: usize,
        dims: usize,
        settings: Settings,
        options: KmeansOptions,
        model: Model,
        init: Option<InitController>,
    ) -> Self {
        let prep = Preprocess::for_settings(&settings, dims);
        let scratch = (!prep.is_identity()).then(|| Array1::zeros(dims));
        tracing::debug!(
            k,
            dims,
            metric = settings.metric.as_str(),
            strategy = settings.strategy.as_str(),
            sample_size = settings.sample_size,
            seeded = init.is_none(),
            seed = settings.seed,
            "created incremental k-means accumulator"
        );
        Self {
            k,
            dims,
            settings,
            options,
            model,
            prep,
            init,
            scratch,
            results: Results::new(k, dims),
        }
    }

    /// Number of clusters.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of dimensions.
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Distance metric.
    pub fn metric(&self) -> Metric {
        self.settings.metric
    }

    /// Seeding strategy (unused when centroids were supplied).
    pub fn strategy(&self) -> Strategy {
        self.settings.strategy
    }

    /// PRNG seed in use, including one drawn because none was given.
    pub fn seed(&self) -> u64 {
        self.settings.seed
    }

    /// Options as supplied at construction.
    pub fn options(&self) -> &KmeansOptions {
        &self.options
    }

    /// Whether centroids exist yet.
    pub fn is_initialized(&self) -> bool {
        self.init.is_none()
    }

    /// Points waiting in the initialization buffer.
    pub fn buffered(&self) -> usize {
        self.init.as_ref().map_or(0, InitController::buffered)
    }

    /// Running per-dimension statistics (correlation metric with normalization).
    pub fn dimension_stats(&self) -> Option<&DimensionStats> {
        self.prep.dimension_stats()
    }

    /// Current results, or `None` while still buffering.
    pub fn results(&self) -> Option<&Results> {
        if self.init.is_some() {
            return None;
        }
        Some(&self.results)
    }

    /// Feed one point.
    ///
    /// Returns `None` while the initialization buffer is filling and the
    /// refreshed results otherwise. The caller's data is never modified.
    ///
    /// Points with a `NaN` or infinite entry are rejected before any state
    /// changes.
    pub fn ingest(&mut self, point: ArrayView1<'_, f64>) -> Result<Option<&Results>> {
        self.check_point(point.len())?;
        check_finite(point)?;
        self.prep.observe(point);

        if let Some(init) = self.init.as_mut() {
            if init.push(point, &mut self.model, &self.prep, &self.settings) == Progress::Buffering {
                return Ok(None);
            }
            self.init = None;
        } else if self.prep.is_identity() {
            self.model.observe(point);
        } else {
            let dims = self.dims;
            let scratch = self.scratch.get_or_insert_with(|| Array1::zeros(dims));
            copy_vector(scratch, point);
            self.prep.apply(scratch.view_mut());
            self.model.observe(scratch.view());
        }
        Ok(Some(self.publish()))
    }

    /// Feed one point the accumulator may normalize in place.
    ///
    /// With `copy` disabled, cosine/correlation preprocessing is written into
    /// `point`; otherwise this behaves like [`ingest`](Self::ingest).
    pub fn ingest_mut(&mut self, mut point: ArrayViewMut1<'_, f64>) -> Result<Option<&Results>> {
        if self.settings.copy || self.prep.is_identity() || self.init.is_some() {
            return self.ingest(point.view());
        }
        self.check_point(point.len())?;
        check_finite(point.view())?;
        self.prep.observe(point.view());
        self.prep.apply(point.view_mut());
        self.model.observe(point.view());
        Ok(Some(self.publish()))
    }

    /// Closest centroid index for every row of `points`.
    ///
    /// Returns `None` while still buffering. Never changes the model.
    pub fn predict(&self, points: ArrayView2<'_, f64>) -> Result<Option<Array1<usize>>> {
        self.check_point(points.ncols())?;
        if self.init.is_some() {
            return Ok(None);
        }
        let mut out = Array1::zeros(points.nrows());
        self.assign_rows(points, out.view_mut());
        Ok(Some(out))
    }

    /// [`predict`](Self::predict) into a caller-provided vector of length `n`.
    pub fn predict_into<'o>(
        &self,
        mut out: ArrayViewMut1<'o, usize>,
        points: ArrayView2<'_, f64>,
    ) -> Result<Option<ArrayViewMut1<'o, usize>>> {
        self.check_point(points.ncols())?;
        if out.len() != points.nrows() {
            return Err(Error::LengthMismatch {
                expected: points.nrows(),
                found: out.len(),
            });
        }
        if self.init.is_some() {
            return Ok(None);
        }
        self.assign_rows(points, out.view_mut());
        Ok(Some(out))
    }

    /// [`predict`](Self::predict) on rows the accumulator may normalize in
    /// place when `copy` is disabled.
    pub fn predict_mut(&self, mut points: ArrayViewMut2<'_, f64>) -> Result<Option<Array1<usize>>> {
        if self.settings.copy || self.prep.is_identity() {
            return self.predict(points.view());
        }
        self.check_point(points.ncols())?;
        if self.init.is_some() {
            return Ok(None);
        }
        self.prep.apply_rows(points.view_mut());
        let mut out = Array1::zeros(points.nrows());
        self.model.predict_rows(points.view(), out.view_mut());
        Ok(Some(out))
    }

    fn assign_rows(&self, points: ArrayView2<'_, f64>, out: ArrayViewMut1<'_, usize>) {
        if self.prep.is_identity() {
            self.model.predict_rows(points, out);
        } else {
            let mut x = owned_copy(points);
            self.prep.apply_rows(x.view_mut());
            self.model.predict_rows(x.view(), out);
        }
    }

    fn check_point(&self, found: usize) -> Result<()> {
        if found != self.dims {
            return Err(Error::DimensionMismatch {
                expected: self.dims,
                found,
            });
        }
        Ok(())
    }

    /// Copy live state into the snapshot in one step.
    fn publish(&mut self) -> &Results {
        copy_contiguous(&mut self.results.centroids, self.model.centroids());
        self.results.stats.assign(&self.model.stats().table());
        &self.results
    }
}

fn check_finite(point: ArrayView1<'_, f64>) -> Result<()> {
    if point.iter().any(|v| !v.is_finite()) {
        return Err(Error::invalid("point", "entries must be finite"));
    }
    Ok(())
}

fn check_positive(name: &'static str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(Error::invalid(name, "must be a positive integer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InitMethod;
    use crate::error::ErrorKind;
    use approx::assert_relative_eq;
    use ndarray::{arr1, arr2};

    fn sample_opts(sample_size: usize) -> KmeansOptions {
        KmeansOptions::default()
            .with_init(InitMethod::new(Strategy::Sample).with_sample_size(sample_size))
            .with_seed(3)
    }

    #[test]
    fn zero_k_or_d_is_config_error() {
        let err = IncrKmeans::new(0, 2, KmeansOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let err = IncrKmeans::new(2, 0, KmeansOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        let empty = Array2::<f64>::zeros((0, 2));
        let err = IncrKmeans::with_centroids(empty.view(), KmeansOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn non_finite_centroids_rejected() {
        let m = arr2(&[[0.0, f64::NAN]]);
        let err = IncrKmeans::with_centroids(m.view(), KmeansOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn pre_seeded_results_available_immediately() {
        let m = arr2(&[[0.0, 0.0], [1.0, 1.0]]);
        let acc = IncrKmeans::with_centroids(m.view(), KmeansOptions::default()).unwrap();
        assert!(acc.is_initialized());
        let r = acc.results().unwrap();
        assert_eq!(r.centroids, m);
        assert_eq!(r.stats, Array2::<f64>::zeros((2, NSTATS)));
    }

    #[test]
    fn buffering_returns_none() {
        let mut acc = IncrKmeans::new(2, 1, sample_opts(3)).unwrap();
        assert!(acc.results().is_none());
        assert!(acc.ingest(arr1(&[1.0]).view()).unwrap().is_none());
        assert!(acc.ingest(arr1(&[2.0]).view()).unwrap().is_none());
        assert_eq!(acc.buffered(), 2);
        assert!(acc.predict(arr2(&[[1.0]]).view()).unwrap().is_none());
        assert!(acc.ingest(arr1(&[50.0]).view()).unwrap().is_some());
        assert!(acc.is_initialized());
        assert_eq!(acc.buffered(), 0);
    }

    #[test]
    fn shape_error_leaves_state_untouched() {
        let mut acc = IncrKmeans::new(1, 2, sample_opts(2)).unwrap();
        acc.ingest(arr1(&[1.0, 1.0]).view()).unwrap();
        let err = acc.ingest(arr1(&[1.0, 1.0, 1.0]).view()).unwrap_err();
        assert_eq!(err, Error::DimensionMismatch { expected: 2, found: 3 });
        assert_eq!(acc.buffered(), 1);

        let r = acc.ingest(arr1(&[3.0, 3.0]).view()).unwrap().unwrap();
        assert_eq!(r.count(0), 2);
        let before = r.clone();

        assert!(acc.ingest(arr1(&[1.0]).view()).is_err());
        let after = acc.results().unwrap();
        assert_eq!(after.centroids, before.centroids);
        assert_eq!(after.count(0), 2);
    }

    #[test]
    fn non_finite_point_rejected_without_side_effects() {
        let m = arr2(&[[0.0, 0.0], [10.0, 10.0]]);
        let mut acc = IncrKmeans::with_centroids(m.view(), KmeansOptions::default()).unwrap();
        for bad in [[f64::NAN, 1.0], [1.0, f64::INFINITY]] {
            let err = acc.ingest(arr1(&bad).view()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config);
        }
        let r = acc.results().unwrap();
        assert_eq!(r.centroids, m);
        assert_eq!(r.count(0) + r.count(1), 0);

        let opts = KmeansOptions::default()
            .with_metric(Metric::Correlation)
            .with_copy(false);
        let mut acc = IncrKmeans::with_centroids(m.view(), opts).unwrap();
        let mut bad = arr1(&[f64::NEG_INFINITY, 2.0]);
        assert!(acc.ingest_mut(bad.view_mut()).is_err());
        assert_eq!(acc.dimension_stats().unwrap().count(), 0);
        assert_eq!(bad[1], 2.0);

        // Buffered points are checked too.
        let mut acc = IncrKmeans::new(2, 2, sample_opts(2)).unwrap();
        assert!(acc.ingest(arr1(&[f64::NAN, 0.0]).view()).is_err());
        assert_eq!(acc.buffered(), 0);
    }

    #[test]
    fn stats_columns_track_assignments() {
        let m = arr2(&[[0.0], [100.0]]);
        let mut acc = IncrKmeans::with_centroids(m.view(), KmeansOptions::default()).unwrap();
        for x in [1.0, 3.0] {
            acc.ingest(arr1(&[x]).view()).unwrap();
        }
        let r = acc.results().unwrap();
        // 0 -> 1 (d = 0), then centroid 2 (d = 1).
        assert_eq!(r.count(0), 2);
        assert_eq!(r.count(1), 0);
        assert_relative_eq!(r.centroids[[0, 0]], 2.0);
        assert_relative_eq!(r.sum(0), 1.0);
        assert_relative_eq!(r.mean(0), 0.5);
        assert_relative_eq!(r.stdev(0), 0.5_f64.sqrt());
        assert_eq!(r.k(), 2);
    }

    #[test]
    fn ingest_does_not_mutate_caller_vector_for_cosine() {
        let m = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
        let opts = KmeansOptions::default().with_metric(Metric::Cosine);
        let mut acc = IncrKmeans::with_centroids(m.view(), opts).unwrap();
        let mut x = arr1(&[3.0, 4.0]);
        acc.ingest_mut(x.view_mut()).unwrap();
        assert_eq!(x, arr1(&[3.0, 4.0]));
    }

    #[test]
    fn ingest_mut_without_copy_normalizes_in_place() {
        let m = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
        let opts = KmeansOptions::default()
            .with_metric(Metric::Cosine)
            .with_copy(false);
        let mut acc = IncrKmeans::with_centroids(m.view(), opts).unwrap();
        let mut x = arr1(&[3.0, 4.0]);
        let r = acc.ingest_mut(x.view_mut()).unwrap().unwrap();
        assert_eq!(r.count(1), 1);
        assert_relative_eq!(x[0], 0.6);
        assert_relative_eq!(x[1], 0.8);
    }

    #[test]
    fn predict_mut_respects_copy_flag() {
        let m = arr2(&[[1.0, 0.0], [0.0, 1.0]]);
        let mut points = arr2(&[[5.0, 0.0], [0.0, 2.0]]);

        let acc = IncrKmeans::with_centroids(
            m.view(),
            KmeansOptions::default().with_metric(Metric::Cosine),
        )
        .unwrap();
        let labels = acc.predict_mut(points.view_mut()).unwrap().unwrap();
        assert_eq!(labels, arr1(&[0usize, 1]));
        assert_eq!(points, arr2(&[[5.0, 0.0], [0.0, 2.0]]));

        let acc = IncrKmeans::with_centroids(
            m.view(),
            KmeansOptions::default()
                .with_metric(Metric::Cosine)
                .with_copy(false),
        )
        .unwrap();
        let labels = acc.predict_mut(points.view_mut()).unwrap().unwrap();
        assert_eq!(labels, arr1(&[0usize, 1]));
        assert_eq!(points, arr2(&[[1.0, 0.0], [0.0, 1.0]]));
    }

    #[test]
    fn predict_into_checks_lengths() {
        let m = arr2(&[[0.0], [10.0]]);
        let acc = IncrKmeans::with_centroids(m.view(), KmeansOptions::default()).unwrap();
        let points = arr2(&[[1.0], [9.0], [4.0]]);

        let mut short = Array1::<usize>::zeros(2);
        let err = acc.predict_into(short.view_mut(), points.view()).unwrap_err();
        assert_eq!(err, Error::LengthMismatch { expected: 3, found: 2 });

        let wide = arr2(&[[1.0, 2.0]]);
        let mut one = Array1::<usize>::zeros(1);
        let err = acc.predict_into(one.view_mut(), wide.view()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Shape);

        let mut out = Array1::<usize>::from_elem(3, 99);
        acc.predict_into(out.view_mut(), points.view()).unwrap().unwrap();
        assert_eq!(out, arr1(&[0usize, 1, 0]));
    }

    #[test]
    fn predict_shape_checked_before_buffering_state() {
        let acc = IncrKmeans::new(2, 2, KmeansOptions::default()).unwrap();
        let wrong = arr2(&[[1.0, 2.0, 3.0]]);
        assert!(acc.predict(wrong.view()).is_err());
        let mut out = Array1::<usize>::zeros(5);
        let ok_cols = arr2(&[[1.0, 2.0]]);
        assert!(acc.predict_into(out.view_mut(), ok_cols.view()).is_err());
    }

    #[test]
    fn from_spec_both_forms() {
        let acc = IncrKmeans::from_spec(CentroidSpec::Dims { k: 3, d: 2 }, KmeansOptions::default()).unwrap();
        assert_eq!((acc.k(), acc.dims()), (3, 2));
        assert!(!acc.is_initialized());

        let acc = IncrKmeans::from_spec(
            CentroidSpec::Centroids(arr2(&[[1.0, 2.0, 3.0]])),
            KmeansOptions::default(),
        )
        .unwrap();
        assert_eq!((acc.k(), acc.dims()), (1, 3));
        assert!(acc.is_initialized());
    }

    #[test]
    fn correlation_tracks_raw_dimension_stats() {
        let opts = KmeansOptions::default()
            .with_metric(Metric::Correlation)
            .with_init(InitMethod::new(Strategy::Sample).with_sample_size(2))
            .with_seed(5);
        let mut acc = IncrKmeans::new(2, 2, opts).unwrap();
        for x in [[1.0, 2.0], [3.0, 6.0], [5.0, 10.0]] {
            acc.ingest(arr1(&x).view()).unwrap();
        }
        let stats = acc.dimension_stats().unwrap();
        assert_eq!(stats.count(), 3);
        assert_relative_eq!(stats.mean()[0], 3.0);
        assert_relative_eq!(stats.mean()[1], 6.0);
    }

    #[test]
    fn seed_is_reported() {
        let acc = IncrKmeans::new(2, 2, KmeansOptions::default().with_seed(1234)).unwrap();
        assert_eq!(acc.seed(), 1234);
        assert_eq!(acc.options().seed, Some(1234));
        assert_eq!(acc.strategy(), Strategy::KmeansPlusPlus);
        assert_eq!(acc.metric(), Metric::Euclidean);
    }
}
