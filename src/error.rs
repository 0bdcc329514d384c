//! Error types for distributional analysis
//!
//! Every fallible operation in the crate returns [`DistResult`]. Errors are
//! raised close to the violation and never retried: the computation is
//! deterministic, so the same input reproduces the same failure.

use thiserror::Error;

/// Result alias used throughout the crate
pub type DistResult<T> = Result<T, DistError>;

/// Failure conditions for distributional analysis
#[derive(Debug, Error)]
pub enum DistError {
    /// A selector, rule or parameter outside its enumerated domain
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The population cannot support the requested statistic
    /// (e.g. every unit excluded, zero total tax change)
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Arrays that must be index-aligned have different lengths
    #[error("shape mismatch in {context}: expected {expected} units, got {actual}")]
    ShapeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// The scenario does not carry the requested field
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DistError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DistError::InvalidArgument(msg.into())
    }

    pub(crate) fn degenerate(msg: impl Into<String>) -> Self {
        DistError::DegenerateInput(msg.into())
    }

    /// Check that `actual` matches `expected`, naming the offending array
    pub(crate) fn check_len(context: &str, expected: usize, actual: usize) -> DistResult<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(DistError::ShapeMismatch {
                context: context.to_string(),
                expected,
                actual,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = DistError::check_len("weights", 4, 3).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("weights"));
        assert!(msg.contains("expected 4"));
        assert!(msg.contains("got 3"));
    }

    #[test]
    fn test_check_len_ok() {
        assert!(DistError::check_len("income", 10, 10).is_ok());
    }

    #[test]
    fn test_invalid_argument_display() {
        let err = DistError::invalid("unknown income measure `gross`");
        assert_eq!(err.to_string(), "invalid argument: unknown income measure `gross`");
    }
}
