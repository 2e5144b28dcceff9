//! Error types for the UMDA core.
//!
//! Every fallible entry point returns [`UmdaError`]. Evaluator faults are
//! carried through unchanged as the error's `source()`.

use std::time::Duration;
use thiserror::Error;

/// Boxed error produced by a user-supplied evaluator.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for learning, sampling, and driving a UMDA run.
#[derive(Debug, Error)]
pub enum UmdaError {
    /// The wall-clock budget ran out before the batch was complete.
    ///
    /// No partial batch is returned; the caller treats this as a hard stop
    /// for the generation.
    #[error(
        "timeout of {timeout:?} exceeded after {elapsed:?} while sampling \
         ({accepted}/{requested} candidates accepted)"
    )]
    TimeoutExceeded {
        elapsed: Duration,
        timeout: Duration,
        accepted: usize,
        requested: usize,
    },

    /// A matrix row with zero total weight was reached with smoothing disabled.
    #[error("degenerate distribution: row {position} has zero total weight and smoothing is disabled")]
    DegenerateDistribution { position: usize },

    /// The evaluator reported a failure. The original error is the source.
    #[error("evaluator failed: {0}")]
    EvaluatorFailure(#[source] BoxedError),

    /// Dimensions of the inputs do not agree.
    #[error("shape mismatch for {what}: expected {expected}, got {actual}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A learned vector holds a value outside the matrix columns.
    #[error("value {value} at position {position} is out of range (limit {limit})")]
    ValueOutOfRange {
        position: usize,
        value: usize,
        limit: usize,
    },

    /// The cancellation flag was raised.
    #[error("sampling cancelled")]
    Cancelled,

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl UmdaError {
    /// Returns `true` for [`UmdaError::TimeoutExceeded`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, UmdaError::TimeoutExceeded { .. })
    }
}
