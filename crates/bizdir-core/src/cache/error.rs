use thiserror::Error;

/// Failure of a refresh as a whole, as opposed to a single collection read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Refresh panicked: {0}")]
    Panicked(String),
}
