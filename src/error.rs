use thiserror::Error;

/// Result alias for `kstream`.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad constructor argument or option value. Construction aborts.
    Config,
    /// Option value of the right type but outside its allowed range.
    Range,
    /// Input does not match the accumulator's dimensions. The call fails,
    /// the accumulator is left untouched.
    Shape,
}

/// Errors returned by the accumulator and its configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Invalid constructor argument or option value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: String,
    },

    /// Options could not be read as a configuration object.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// Initialization sample is smaller than the number of clusters.
    #[error("initialization sample size {sample_size} must be at least the number of clusters ({k})")]
    SampleSizeTooSmall {
        /// Configured sample size.
        sample_size: usize,
        /// Number of clusters.
        k: usize,
    },

    /// Vector length or matrix column count does not match the centroid dimensions.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Output vector length does not match the number of data points.
    #[error("output length mismatch: expected {expected}, found {found}")]
    LengthMismatch {
        /// Number of data points.
        expected: usize,
        /// Output vector length.
        found: usize,
    },
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }

    /// Which failure class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParameter { .. } | Error::InvalidOptions(_) => ErrorKind::Config,
            Error::SampleSizeTooSmall { .. } => ErrorKind::Range,
            Error::DimensionMismatch { .. } | Error::LengthMismatch { .. } => ErrorKind::Shape,
        }
    }
}
