//! Crate-wide error type.
//!
//! Every variant maps to a process exit code so the binary can report
//! failures the same way regardless of which layer raised them:
//!
//! - `2`: bad input or configuration
//! - `3`: not enough data to compute anything
//! - `4`: computation failed

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// The free-value vector does not match the number of `vary = true` parameters.
    #[error("Invalid parameter count: expected {expected} free values, got {actual}.")]
    InvalidParameterCount { expected: usize, actual: usize },

    /// No posterior draws were supplied.
    #[error("Insufficient samples: at least one posterior draw is required.")]
    InsufficientSamples,

    /// A model curve does not cover the wavelength grid.
    #[error("Model curve for draw {draw} has {actual} bins, expected {expected}.")]
    CurveLength {
        draw: usize,
        expected: usize,
        actual: usize,
    },

    /// The profile model could not produce a usable curve.
    #[error("Model evaluation failed: {0}")]
    ModelEvaluation(String),

    /// Malformed input data or configuration.
    #[error("{0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::InvalidParameterCount { .. }
            | AppError::InvalidInput(_)
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Csv(_) => 2,
            AppError::InsufficientSamples => 3,
            AppError::CurveLength { .. } | AppError::ModelEvaluation(_) => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let count = AppError::InvalidParameterCount { expected: 3, actual: 2 };
        assert_eq!(count.exit_code(), 2);
        assert_eq!(AppError::InsufficientSamples.exit_code(), 3);
        assert_eq!(AppError::ModelEvaluation("nan".into()).exit_code(), 4);
    }

    #[test]
    fn count_error_message_names_both_sides() {
        let err = AppError::InvalidParameterCount { expected: 3, actual: 2 };
        let msg = err.to_string();
        assert!(msg.contains("expected 3"));
        assert!(msg.contains("got 2"));
    }
}
