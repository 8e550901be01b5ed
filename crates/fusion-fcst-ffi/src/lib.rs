//! FFI boundary layer for the fusion-forecast helpers.
//!
//! This crate provides C-compatible wrappers around `fusion-fcst-core`.
//! Every entry point returns `true` on success and fills a [`FusionError`]
//! otherwise. Arrays in results are `malloc`-allocated and must be released
//! with the matching `fusion_free_*` function.

pub mod allocation;
pub mod conversion;
pub mod error_handling;
pub mod types;

use allocation::alloc_and_copy_array;
use conversion::{parse_c_buf, to_option_f64_not_nan, to_option_f64_positive, to_option_usize};
use error_handling::{check_null_pointers, ffi_try, init_error};
use fusion_fcst_core::{ForecastError, Initialization, OptimizerOptions};
use core::ffi::c_void;
use libc::{c_char, c_double, c_int, size_t};

pub use types::*;

// ============================================================================
// Helper Functions
// ============================================================================

/// Translate C options into core options. The horizon is handled separately.
fn to_core_options(
    opts: &SmoothingOptionsC,
) -> Result<fusion_fcst_core::SmoothingOptions, ForecastError> {
    let defaults = OptimizerOptions::default();

    Ok(fusion_fcst_core::SmoothingOptions {
        trend: parse_c_buf(&opts.trend, "trend")?,
        damped_trend: opts.damped_trend,
        seasonal: parse_c_buf(&opts.seasonal, "seasonal")?,
        seasonal_periods: to_option_usize(opts.seasonal_periods),
        initialization: if opts.estimate_initial_state {
            Initialization::Estimated
        } else {
            Initialization::Heuristic
        },
        smoothing_level: to_option_f64_positive(opts.smoothing_level),
        smoothing_trend: to_option_f64_positive(opts.smoothing_trend),
        smoothing_seasonal: to_option_f64_positive(opts.smoothing_seasonal),
        boxcox_lambda: to_option_f64_not_nan(opts.boxcox_lambda),
        remove_bias: opts.remove_bias,
        optimizer: OptimizerOptions {
            max_iter: to_option_usize(opts.max_iter).unwrap_or(defaults.max_iter),
            ..defaults
        },
    })
}

fn to_horizon(horizon: c_int) -> Result<usize, ForecastError> {
    usize::try_from(horizon).map_err(|_| {
        ForecastError::InvalidInput(format!("horizon must be non-negative, got {}", horizon))
    })
}

// ============================================================================
// Forecasting
// ============================================================================

/// Fit a damped Holt-Winters model and split its predictions into the
/// in-sample fit and `options.horizon` future values.
///
/// # Safety
/// `values` must point to `length` doubles; `options` and `out_result` must be
/// valid. `out_error` must be valid if non-null.
#[no_mangle]
pub unsafe extern "C" fn fusion_ts_forecast_smoothing(
    values: *const c_double,
    length: size_t,
    options: *const SmoothingOptionsC,
    out_result: *mut SmoothingResult,
    out_error: *mut FusionError,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[
            values as *const c_void,
            options as *const c_void,
            out_result as *const c_void,
        ],
    ) {
        return false;
    }

    let outcome = ffi_try(out_error, || {
        let y = std::slice::from_raw_parts(values, length);
        let opts = &*options;

        let horizon = to_horizon(opts.horizon)?;
        let core_opts = to_core_options(opts)?;
        let fit = fusion_fcst_core::fit_smoothing(y, opts.damping_slope, &core_opts)?;
        let forecast = fit.split_predictions(horizon)?;
        Ok((fit, forecast))
    });

    let Some((fit, forecast)) = outcome else {
        return false;
    };

    let r = &mut *out_result;
    *r = SmoothingResult::default();
    if !alloc_and_copy_array(&forecast.historical_fit, &mut r.historical_fit, out_error)
        || !alloc_and_copy_array(&forecast.future_forecast, &mut r.future_forecast, out_error)
    {
        fusion_free_smoothing_result(r);
        return false;
    }
    r.n_historical = forecast.historical_fit.len();
    r.n_future = forecast.future_forecast.len();
    r.set_fit(&fit);

    true
}

// ============================================================================
// Spectral Analysis
// ============================================================================

/// Magnitudes of DFT bins `1..N/2-1` of the input series.
///
/// A series shorter than four points succeeds with an empty result.
///
/// # Safety
/// `values` must point to `length` doubles and `out_result` must be valid.
/// `out_error` must be valid if non-null.
#[no_mangle]
pub unsafe extern "C" fn fusion_ts_spectral_magnitude(
    values: *const c_double,
    length: size_t,
    out_result: *mut SpectralResult,
    out_error: *mut FusionError,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[values as *const c_void, out_result as *const c_void],
    ) {
        return false;
    }

    let outcome = ffi_try(out_error, || {
        let y = std::slice::from_raw_parts(values, length);
        Ok(fusion_fcst_core::spectral_magnitude(y))
    });

    let Some(spectrum) = outcome else {
        return false;
    };

    let bins: Vec<c_int> = spectrum.bins.iter().map(|&k| k as c_int).collect();

    let r = &mut *out_result;
    *r = SpectralResult::default();
    if !alloc_and_copy_array(&spectrum.magnitudes, &mut r.magnitudes, out_error)
        || !alloc_and_copy_array(&bins, &mut r.bins, out_error)
    {
        fusion_free_spectral_result(r);
        return false;
    }
    r.length = spectrum.len();

    true
}

// ============================================================================
// Metrics
// ============================================================================

/// Weighted MAPE: `sum|forecast - actual| / sum(actual)`.
///
/// The denominator is not guarded, so a zero sum yields `inf` or `NaN`.
///
/// # Safety
/// `forecast` and `actual` must point to `forecast_len` and `actual_len`
/// doubles; `out_result` must be valid. `out_error` must be valid if non-null.
#[no_mangle]
pub unsafe extern "C" fn fusion_ts_weighted_mape(
    forecast: *const c_double,
    forecast_len: size_t,
    actual: *const c_double,
    actual_len: size_t,
    out_result: *mut c_double,
    out_error: *mut FusionError,
) -> bool {
    init_error(out_error);

    if check_null_pointers(
        out_error,
        &[
            forecast as *const c_void,
            actual as *const c_void,
            out_result as *const c_void,
        ],
    ) {
        return false;
    }

    let outcome = ffi_try(out_error, || {
        let f = std::slice::from_raw_parts(forecast, forecast_len);
        let a = std::slice::from_raw_parts(actual, actual_len);
        fusion_fcst_core::weighted_mape(f, a)
    });

    match outcome {
        Some(value) => {
            *out_result = value;
            true
        }
        None => false,
    }
}

// ============================================================================
// Memory Management
// ============================================================================

/// Free the arrays of a SmoothingResult.
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fusion_free_smoothing_result(result: *mut SmoothingResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    crate::free_fields!(r, historical_fit, future_forecast);
    r.n_historical = 0;
    r.n_future = 0;
}

/// Free the arrays of a SpectralResult.
///
/// # Safety
/// The result pointer must be valid or null.
#[no_mangle]
pub unsafe extern "C" fn fusion_free_spectral_result(result: *mut SpectralResult) {
    if result.is_null() {
        return;
    }
    let r = &mut *result;
    crate::free_fields!(r, magnitudes, bins);
    r.length = 0;
}

// ============================================================================
// Version
// ============================================================================

#[no_mangle]
pub extern "C" fn fusion_fcst_version() -> *const c_char {
    static VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "\0");
    VERSION.as_ptr() as *const c_char
}
