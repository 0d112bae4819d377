//! Error types for the Ant System solver.
//!
//! Every fallible operation in the library returns [`Result<T>`]. Input
//! problems are reported before any computation starts; broken internal
//! invariants are reported as [`AntSystemError::InvariantViolation`] and
//! abort the run.

use thiserror::Error;

/// Result type alias for solver operations.
pub type Result<T> = std::result::Result<T, AntSystemError>;

/// Unified error type for the solver and its I/O collaborators.
#[derive(Debug, Error)]
pub enum AntSystemError {
    /// Coordinates or parameters outside their valid range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Malformed TSPLIB instance file.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number in the instance file.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// A tour or the pheromone matrix broke a structural invariant.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AntSystemError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        AntSystemError::InvalidInput(message.into())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        AntSystemError::Parse {
            line,
            message: message.into(),
        }
    }
}
