use thiserror::Error;

/// Errors raised while preparing the inputs or estimating activities.
///
/// Numerical degeneracy (a zero-variance null distribution) is not an
/// error; it shows up as `NaN` in the normalized scores.
#[derive(Error, Debug)]
pub enum ActivityError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("no sources left in the network: {0}")]
    EmptyNetwork(String),

    #[error("empty result: {0}")]
    EmptyResult(String),

    #[error("dimension mismatch in {what}: {left} vs. {right}")]
    DimensionMismatch {
        what: &'static str,
        left: usize,
        right: usize,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type ActResult<T> = std::result::Result<T, ActivityError>;

impl ActivityError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        ActivityError::Validation(msg.into())
    }
}
