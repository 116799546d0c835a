//! Accumulator options.
//!
//! Options are built either in code:
//!
//! ```rust
//! use kstream::{InitMethod, KmeansOptions, Metric, Strategy};
//!
//! let opts = KmeansOptions::default()
//!     .with_metric(Metric::Cosine)
//!     .with_init(InitMethod::new(Strategy::Sample).with_sample_size(20))
//!     .with_seed(7);
//! assert_eq!(opts.metric, Metric::Cosine);
//! ```
//!
//! or read from JSON, where `init` takes the compact list form
//! `[strategy, sample_size?, trials?]`:
//!
//! ```rust
//! use kstream::{KmeansOptions, Strategy};
//!
//! let value = serde_json::json!({
//!     "metric": "correlation",
//!     "init": ["kmeans++", 50, 4],
//!     "seed": 1234
//! });
//! let opts = KmeansOptions::from_json(&value).unwrap();
//! assert_eq!(opts.init.unwrap().strategy, Strategy::KmeansPlusPlus);
//! ```

use crate::distance::Metric;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Seeding strategy for the initial centroids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Strategy {
    /// Assign buffered points to random clusters and use the cluster means.
    #[serde(rename = "forgy")]
    Forgy,
    /// Use a random subset of the buffered points.
    #[serde(rename = "sample")]
    Sample,
    /// Spread centroids by sampling proportional to squared distance.
    #[default]
    #[serde(rename = "kmeans++")]
    KmeansPlusPlus,
}

impl Strategy {
    /// Name as accepted by the options parser.
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Forgy => "forgy",
            Strategy::Sample => "sample",
            Strategy::KmeansPlusPlus => "kmeans++",
        }
    }

    fn parse(name: &str) -> std::result::Result<Self, String> {
        match name {
            "forgy" => Ok(Strategy::Forgy),
            "sample" => Ok(Strategy::Sample),
            "kmeans++" => Ok(Strategy::KmeansPlusPlus),
            other => Err(format!(
                "unknown initialization strategy `{other}` (expected forgy, sample or kmeans++)"
            )),
        }
    }
}

/// How initial centroids are computed when none are supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "InitRepr")]
pub struct InitMethod {
    /// Seeding strategy.
    pub strategy: Strategy,
    /// Number of points buffered before seeding. Defaults to `k`.
    pub sample_size: Option<usize>,
    /// Candidate draws per centroid (k-means++ only). Defaults to `2 + floor(ln k)`.
    pub trials: Option<usize>,
}

impl InitMethod {
    /// Strategy with default sample size and trials.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            sample_size: None,
            trials: None,
        }
    }

    /// Set the number of points to buffer before seeding.
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = Some(sample_size);
        self
    }

    /// Set the number of k-means++ candidate trials.
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = Some(trials);
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InitRepr {
    List(Vec<serde_json::Value>),
    Object {
        strategy: Strategy,
        #[serde(default)]
        sample_size: Option<usize>,
        #[serde(default)]
        trials: Option<usize>,
    },
}

impl TryFrom<InitRepr> for InitMethod {
    type Error = String;

    fn try_from(repr: InitRepr) -> std::result::Result<Self, String> {
        let (strategy, sample_size, trials) = match repr {
            InitRepr::Object {
                strategy,
                sample_size,
                trials,
            } => (strategy, sample_size, trials),
            InitRepr::List(items) => {
                if items.is_empty() || items.len() > 3 {
                    return Err(format!(
                        "`init` must have 1 to 3 elements, found {}",
                        items.len()
                    ));
                }
                let strategy = items[0]
                    .as_str()
                    .ok_or_else(|| "`init` strategy must be a string".to_string())
                    .and_then(Strategy::parse)?;
                let sample_size = items.get(1).map(|v| positive_int(v, "sample size")).transpose()?;
                let trials = items.get(2).map(|v| positive_int(v, "trials")).transpose()?;
                (strategy, sample_size, trials)
            }
        };
        if sample_size == Some(0) {
            return Err("`init` sample size must be a positive integer".to_string());
        }
        if trials == Some(0) {
            return Err("`init` trials must be a positive integer".to_string());
        }
        Ok(InitMethod {
            strategy,
            sample_size,
            trials,
        })
    }
}

fn positive_int(v: &serde_json::Value, what: &str) -> std::result::Result<usize, String> {
    v.as_u64()
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| format!("`init` {what} must be a positive integer, found {v}"))
}

/// Options for [`IncrKmeans`](crate::IncrKmeans).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansOptions {
    /// Distance metric.
    pub metric: Metric,
    /// Initial centroid computation. Ignored when centroids are supplied.
    pub init: Option<InitMethod>,
    /// Normalize incoming data (cosine, correlation only).
    pub normalize: bool,
    /// Normalize a private copy instead of the caller's buffer.
    pub copy: bool,
    /// PRNG seed. Drawn from the thread RNG when absent.
    pub seed: Option<u64>,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self {
            metric: Metric::Euclidean,
            init: None,
            normalize: true,
            copy: true,
            seed: None,
        }
    }
}

impl KmeansOptions {
    /// Parse options from a JSON object. Unknown keys are ignored.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidOptions(format!(
                "options must be an object, found {value}"
            )));
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidOptions(e.to_string()))
    }

    /// Set the distance metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the initialization method.
    pub fn with_init(mut self, init: InitMethod) -> Self {
        self.init = Some(init);
        self
    }

    /// Enable or disable normalization.
    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Enable or disable defensive copies before normalization.
    pub fn with_copy(mut self, copy: bool) -> Self {
        self.copy = copy;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fill in defaults for `k` clusters and check ranges.
    pub(crate) fn resolve(&self, k: usize) -> Result<Settings> {
        let init = self.init.unwrap_or_default();
        let sample_size = init.sample_size.unwrap_or(k);
        if sample_size == 0 {
            return Err(Error::invalid("init", "sample size must be a positive integer"));
        }
        if sample_size < k {
            return Err(Error::SampleSizeTooSmall { sample_size, k });
        }
        let trials = match init.trials {
            Some(0) => return Err(Error::invalid("init", "trials must be a positive integer")),
            Some(t) => t,
            None => default_trials(k),
        };
        Ok(Settings {
            metric: self.metric,
            strategy: init.strategy,
            sample_size,
            trials,
            normalize: self.normalize && self.metric.needs_preprocessing(),
            copy: self.copy,
            seed: self.seed.unwrap_or_else(|| rand::rng().random()),
        })
    }
}

/// Candidate draws per centroid recommended by Arthur & Vassilvitskii (2007).
pub fn default_trials(k: usize) -> usize {
    2 + (k as f64).ln().floor() as usize
}

/// Options with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Settings {
    pub metric: Metric,
    pub strategy: Strategy,
    pub sample_size: usize,
    pub trials: usize,
    /// Already false for the Euclidean metric.
    pub normalize: bool,
    pub copy: bool,
    pub seed: u64,
}
