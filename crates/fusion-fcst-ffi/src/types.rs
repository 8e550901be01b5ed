//! C-compatible type definitions for the FFI boundary.

use fusion_fcst_core::ForecastError;
use libc::{c_char, c_double, c_int, size_t};

/// Error codes for FFI boundary.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = 1,
    InvalidInput = 2,
    ComputationError = 3,
    AllocationError = 4,
    InsufficientData = 5,
    InvalidParameter = 6,
    PanicCaught = 7,
}

impl From<&ForecastError> for ErrorCode {
    fn from(err: &ForecastError) -> Self {
        match err.to_code() {
            1 => ErrorCode::NullPointer,
            2 => ErrorCode::InvalidInput,
            4 => ErrorCode::AllocationError,
            5 => ErrorCode::InsufficientData,
            6 => ErrorCode::InvalidParameter,
            _ => ErrorCode::ComputationError,
        }
    }
}

/// Error structure with message buffer for FFI.
#[repr(C)]
pub struct FusionError {
    pub code: ErrorCode,
    pub message: [c_char; 256],
}

impl FusionError {
    /// Create a success error (no error).
    pub fn success() -> Self {
        Self {
            code: ErrorCode::Success,
            message: [0; 256],
        }
    }

    /// Set an error with code and message.
    pub fn set_error(&mut self, code: ErrorCode, msg: &str) {
        self.code = code;
        copy_str_to_buffer(msg, &mut self.message);
    }
}

impl Default for FusionError {
    fn default() -> Self {
        Self::success()
    }
}

/// Copy `s` into a fixed C buffer, truncating and always null-terminating.
pub(crate) fn copy_str_to_buffer(s: &str, buffer: &mut [c_char]) {
    if buffer.is_empty() {
        return;
    }
    let bytes = s.as_bytes();
    let len = bytes.len().min(buffer.len() - 1);
    for (dst, &b) in buffer.iter_mut().zip(&bytes[..len]) {
        *dst = b as c_char;
    }
    buffer[len] = 0;
}

/// Holt-Winters options.
///
/// Component names are case-insensitive ("none", "additive"/"add",
/// "multiplicative"/"mul"); an empty buffer means "none".
#[repr(C)]
pub struct SmoothingOptionsC {
    /// Trend component (null-terminated string)
    pub trend: [c_char; 16],
    /// Seasonal component (null-terminated string)
    pub seasonal: [c_char; 16],
    /// Seasonal period (<= 0 = none)
    pub seasonal_periods: c_int,
    /// Damp the trend with `damping_slope`
    pub damped_trend: bool,
    /// Number of out-of-sample steps (must be >= 0)
    pub horizon: c_int,
    /// Damping coefficient phi
    pub damping_slope: c_double,
    /// Fixed alpha (<= 0 = estimate)
    pub smoothing_level: c_double,
    /// Fixed beta (<= 0 = estimate)
    pub smoothing_trend: c_double,
    /// Fixed gamma (<= 0 = estimate)
    pub smoothing_seasonal: c_double,
    /// Box-Cox lambda (NaN = no transform)
    pub boxcox_lambda: c_double,
    /// Estimate the initial state jointly with the smoothing parameters
    pub estimate_initial_state: bool,
    /// Shift predictions by the mean in-sample residual
    pub remove_bias: bool,
    /// Optimizer iteration limit (<= 0 = default)
    pub max_iter: c_int,
}

impl Default for SmoothingOptionsC {
    fn default() -> Self {
        let mut trend = [0 as c_char; 16];
        let mut seasonal = [0 as c_char; 16];
        copy_str_to_buffer("none", &mut trend);
        copy_str_to_buffer("none", &mut seasonal);
        Self {
            trend,
            seasonal,
            seasonal_periods: 0,
            damped_trend: true,
            horizon: fusion_fcst_core::DEFAULT_HORIZON as c_int,
            damping_slope: fusion_fcst_core::DEFAULT_DAMPING_SLOPE,
            smoothing_level: 0.0,
            smoothing_trend: 0.0,
            smoothing_seasonal: 0.0,
            boxcox_lambda: f64::NAN,
            estimate_initial_state: false,
            remove_bias: false,
            max_iter: 0,
        }
    }
}

/// Holt-Winters result structure.
///
/// Parameters that are not part of the model are NaN.
#[repr(C)]
pub struct SmoothingResult {
    /// In-sample one-step-ahead predictions
    pub historical_fit: *mut c_double,
    /// Out-of-sample forecasts
    pub future_forecast: *mut c_double,
    /// Number of in-sample values
    pub n_historical: size_t,
    /// Number of forecast values
    pub n_future: size_t,
    pub alpha: c_double,
    pub beta: c_double,
    pub gamma: c_double,
    pub phi: c_double,
    /// Sum of squared one-step errors
    pub sse: c_double,
    pub aic: c_double,
    pub bic: c_double,
    /// Optimizer stopped on its tolerance
    pub converged: bool,
    /// Model name, e.g. "ETS(A,Ad,A)"
    pub model_name: [c_char; 32],
}

impl Default for SmoothingResult {
    fn default() -> Self {
        Self {
            historical_fit: std::ptr::null_mut(),
            future_forecast: std::ptr::null_mut(),
            n_historical: 0,
            n_future: 0,
            alpha: f64::NAN,
            beta: f64::NAN,
            gamma: f64::NAN,
            phi: f64::NAN,
            sse: f64::NAN,
            aic: f64::NAN,
            bic: f64::NAN,
            converged: false,
            model_name: [0; 32],
        }
    }
}

impl SmoothingResult {
    /// Copy the scalar fit statistics; arrays are filled separately.
    pub(crate) fn set_fit(&mut self, fit: &fusion_fcst_core::SmoothingFit) {
        self.alpha = fit.alpha;
        self.beta = fit.beta.unwrap_or(f64::NAN);
        self.gamma = fit.gamma.unwrap_or(f64::NAN);
        self.phi = fit.phi.unwrap_or(f64::NAN);
        self.sse = fit.sse;
        self.aic = fit.aic;
        self.bic = fit.bic;
        self.converged = fit.converged;
        copy_str_to_buffer(&fit.model_name(), &mut self.model_name);
    }
}

/// Magnitude spectrum result structure.
#[repr(C)]
pub struct SpectralResult {
    /// Magnitudes of bins 1..N/2-1
    pub magnitudes: *mut c_double,
    /// Bin index of each magnitude
    pub bins: *mut c_int,
    pub length: size_t,
}

impl Default for SpectralResult {
    fn default() -> Self {
        Self {
            magnitudes: std::ptr::null_mut(),
            bins: std::ptr::null_mut(),
            length: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_error_code_from_forecast_error() {
        let err = ForecastError::InsufficientData { needed: 4, got: 1 };
        assert_eq!(ErrorCode::from(&err), ErrorCode::InsufficientData);

        let err = ForecastError::invalid_parameter("trend", "foo", "unknown");
        assert_eq!(ErrorCode::from(&err), ErrorCode::InvalidParameter);

        let err = ForecastError::ComputationError("diverged".to_string());
        assert_eq!(ErrorCode::from(&err), ErrorCode::ComputationError);
    }

    #[test]
    fn test_set_error_truncates_message() {
        let mut error = FusionError::default();
        let long = "x".repeat(400);
        error.set_error(ErrorCode::InvalidInput, &long);

        assert_eq!(error.code, ErrorCode::InvalidInput);
        assert_eq!(error.message[255], 0);
        let msg = unsafe { CStr::from_ptr(error.message.as_ptr()) };
        assert_eq!(msg.to_bytes().len(), 255);
    }

    #[test]
    fn test_default_options() {
        let opts = SmoothingOptionsC::default();
        let trend = unsafe { CStr::from_ptr(opts.trend.as_ptr()) };
        assert_eq!(trend.to_str().unwrap(), "none");
        assert_eq!(opts.horizon, 1);
        assert_eq!(opts.damping_slope, 0.9);
        assert!(opts.damped_trend);
        assert!(opts.boxcox_lambda.is_nan());
    }
}
