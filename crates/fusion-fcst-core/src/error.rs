//! Error types for the forecasting helpers.

use thiserror::Error;

/// Result type for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Error types for forecasting helper operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Null pointer argument: {0}")]
    NullPointer(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Allocation error: {0}")]
    AllocationError(String),

    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Invalid parameter '{param}' = '{value}': {reason}")]
    InvalidParameter {
        param: String,
        value: String,
        reason: String,
    },
}

impl ForecastError {
    /// Shorthand for an [`ForecastError::InvalidParameter`] built from any displayable value.
    pub fn invalid_parameter(
        param: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        ForecastError::InvalidParameter {
            param: param.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Convert to an error code for FFI.
    pub fn to_code(&self) -> i32 {
        match self {
            ForecastError::NullPointer(_) => 1,
            ForecastError::InvalidInput(_) => 2,
            ForecastError::ComputationError(_) => 3,
            ForecastError::AllocationError(_) => 4,
            ForecastError::InsufficientData { .. } => 5,
            ForecastError::InvalidParameter { .. } => 6,
        }
    }
}
