//! Buffer-then-seed initialization.
//!
//! The first `sample_size` points are buffered raw. When the buffer is
//! full it is preprocessed in one batch, seeded with the configured
//! strategy, and then replayed through [`Model::observe`] so the cluster
//! statistics look exactly as if those points had arrived after seeding.
//!
//! Buffered points are preprocessed only once, at seeding time, with the
//! statistics available then; points arriving later are preprocessed one
//! by one with the statistics at their arrival.

use super::assign::Model;
use super::forgy::Forgy;
use super::kmeans_pp::KmeansPlusPlus;
use super::preprocess::Preprocess;
use super::sample::RandomSample;
use super::traits::Seeding;
use crate::config::{Settings, Strategy};
use ndarray::{Array2, ArrayView1};

/// Outcome of buffering one point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Still collecting; no centroids yet.
    Buffering,
    /// Centroids seeded and buffered points assigned.
    Seeded,
}

/// Scratch buffer collecting the seeding sample.
#[derive(Debug, Clone)]
pub struct InitController {
    buffer: Array2<f64>,
    filled: usize,
}

impl InitController {
    /// Controller collecting `sample_size` points of `dims` dimensions.
    pub fn new(sample_size: usize, dims: usize) -> Self {
        Self {
            buffer: Array2::zeros((sample_size, dims)),
            filled: 0,
        }
    }

    /// Points buffered so far.
    pub fn buffered(&self) -> usize {
        self.filled
    }

    /// Number of points needed before seeding.
    pub fn sample_size(&self) -> usize {
        self.buffer.nrows()
    }

    /// Buffer `x`; seed `model` once the buffer is full.
    pub(crate) fn push(
        &mut self,
        x: ArrayView1<'_, f64>,
        model: &mut Model,
        prep: &Preprocess,
        settings: &Settings,
    ) -> Progress {
        debug_assert!(self.filled < self.buffer.nrows());
        self.buffer.row_mut(self.filled).assign(&x);
        self.filled += 1;
        if self.filled < self.buffer.nrows() {
            return Progress::Buffering;
        }

        prep.apply_rows(self.buffer.view_mut());

        tracing::debug!(
            strategy = settings.strategy.as_str(),
            sample_size = self.sample_size(),
            k = model.centroids().nrows(),
            seed = settings.seed,
            "initialization buffer full; seeding centroids"
        );
        seed_centroids(settings, model, &self.buffer);

        for row in self.buffer.rows() {
            model.observe(row);
        }
        Progress::Seeded
    }
}

fn seed_centroids(settings: &Settings, model: &mut Model, sample: &Array2<f64>) {
    let centroids = model.centroids_mut();
    let sample = sample.view();
    match settings.strategy {
        Strategy::Forgy => Forgy.init_centroids(centroids, sample, settings.seed),
        Strategy::Sample => RandomSample.init_centroids(centroids, sample, settings.seed),
        Strategy::KmeansPlusPlus => {
            KmeansPlusPlus::new(settings.metric.squared_distance(), settings.trials)
                .init_centroids(centroids, sample, settings.seed)
        }
    }
}
