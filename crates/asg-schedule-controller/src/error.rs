//! Controller error types.

use std::fmt;
use std::time::Duration;

use asg_schedule_core::DecodeError;
use thiserror::Error;

/// Result type alias for provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// A failed call to the cloud provider, surfaced verbatim.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{operation}: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    #[error("{operation}: timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("autoscaling group {0} not found")]
    NotFound(String),
}

/// Why a single group could not be scaled.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScaleError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// A failure attributed to one autoscaling group.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{group}: {source}")]
pub struct ResourceError {
    pub group: String,
    #[source]
    pub source: ScaleError,
}

/// Every per-group failure of one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedError(pub Vec<ResourceError>);

impl AggregatedError {
    pub fn errors(&self) -> &[ResourceError] {
        &self.0
    }

    /// Names of the groups that failed, in processing order.
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.group.as_str())
    }
}

impl fmt::Display for AggregatedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatedError {}

/// Failure of a whole scale-up / scale-down pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("list autoscaling groups: {0}")]
    List(#[source] ProviderError),

    #[error(transparent)]
    Aggregated(#[from] AggregatedError),
}
