//! Generator errors.

use strand_core::BoxError;
use thiserror::Error;

/// Why a generator stopped early.
///
/// Returned at most once per generator, by the `advance` that follows the
/// failure. Every later `advance` reports exhaustion.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The producer body returned an error.
    #[error("production failed: {0}")]
    Production(#[source] BoxError),

    /// The producer body panicked.
    #[error("producer panicked: {0}")]
    Panicked(String),

    /// The producer suspended on something other than a yield.
    ///
    /// Generators are resumed synchronously, so a body that awaits an
    /// unfinished foreign future cannot make progress.
    #[error("producer suspended without yielding a value")]
    Stalled,
}

impl GeneratorError {
    /// Wrap any error as a production failure.
    pub fn production(err: impl Into<BoxError>) -> Self {
        Self::Production(err.into())
    }
}
