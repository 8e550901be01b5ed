//! Core numerics for the fusion-forecast toolkit.
//!
//! This crate provides the Rust implementation of three forecasting helpers:
//! a damped Holt-Winters forecast wrapper, an FFT magnitude spectrum, and the
//! weighted mean absolute percentage error.

pub mod error;
pub mod metrics;
pub mod smoothing;
pub mod spectral;

// Re-exports for convenience
pub use error::{ForecastError, Result};
pub use metrics::weighted_mape;
pub use smoothing::{
    fit_smoothing, forecast_smoothing, Initialization, OptimizerOptions, SeasonalType,
    SmoothingFit, SmoothingForecast, SmoothingOptions, SmoothingState, TrendType,
    DEFAULT_DAMPING_SLOPE, DEFAULT_HORIZON,
};
pub use spectral::{spectral_magnitude, SpectralMagnitude};
