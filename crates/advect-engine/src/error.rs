//! Run-level error type.

use std::error::Error;
use std::fmt;

use advect_batch::BatchError;
use advect_core::CoreError;

use crate::config::ConfigError;

/// Errors returned by [`Advector`](crate::Advector).
#[derive(Clone, Debug, PartialEq)]
pub enum AdvectError {
    /// The configuration failed validation.
    Config(ConfigError),
    /// A batch could not be built or unpacked.
    Batch(BatchError),
    /// The field sampler returned a sample the particle cannot consume.
    /// The run stops after the round in which this happened.
    Sample {
        /// Lowest batch index that failed in that round.
        index: usize,
        /// The underlying arity error.
        source: CoreError,
    },
}

impl fmt::Display for AdvectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Batch(e) => write!(f, "batch: {e}"),
            Self::Sample { index, source } => write!(f, "particle {index}: {source}"),
        }
    }
}

impl Error for AdvectError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Batch(e) => Some(e),
            Self::Sample { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for AdvectError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<BatchError> for AdvectError {
    fn from(e: BatchError) -> Self {
        Self::Batch(e)
    }
}
