use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the integration core.
///
/// Configuration and programming errors are reported here at construction
/// time. Numerical edge cases inside a step are handled locally and never
/// surface as an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user or API parameter.
    #[error("invalid parameter: {0}")]
    InvalidParam(String),

    /// A vector, array or state had the wrong spatial dimension or length.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A shape query that is not defined for the requested dimension.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),

    /// Degenerate geometry (e.g., zero-length polygon edge).
    #[error("numerical error: {0}")]
    MathError(String),
}
