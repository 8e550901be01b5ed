//! Evaluation metrics for time series forecasting.

use crate::error::{ForecastError, Result};

/// Calculates the Weighted Mean Absolute Percentage Error.
///
/// WMAPE is the ratio of the total absolute error to the total of the actual
/// values. It is a ratio of sums: no per-point weights are applied, and the
/// result is not scaled to a percentage.
///
/// The denominator is not guarded. When `sum(actual)` is zero the result is
/// `inf` (or `NaN` when the forecast is also exact); handling that case is the
/// caller's responsibility.
///
/// # Arguments
/// * `forecast` - Slice of forecasted/predicted values
/// * `actual` - Slice of actual observed values
///
/// # Returns
/// The WMAPE as a fraction, or an error if the inputs differ in length or are empty
///
/// # Formula
/// WMAPE = Σ|forecast_i - actual_i| / Σ actual_i
///
/// # Example
/// ```
/// use fusion_fcst_core::metrics::weighted_mape;
/// let forecast = vec![2.0, 2.0];
/// let actual = vec![1.0, 1.0];
/// assert_eq!(weighted_mape(&forecast, &actual).unwrap(), 1.0);
/// ```
pub fn weighted_mape(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    validate_inputs(forecast, actual)?;
    let abs_error: f64 = forecast
        .iter()
        .zip(actual.iter())
        .map(|(f, a)| (f - a).abs())
        .sum();
    let total: f64 = actual.iter().sum();
    Ok(abs_error / total)
}

fn validate_inputs(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() {
        return Err(ForecastError::InvalidInput(format!(
            "Forecast and actual arrays must have the same length: {} vs {}",
            forecast.len(),
            actual.len()
        )));
    }
    if actual.is_empty() {
        return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weighted_mape_doubled_forecast() {
        // Total absolute error 2, total actual 2
        let result = weighted_mape(&[2.0, 2.0], &[1.0, 1.0]).unwrap();
        assert_eq!(result, 1.0);
    }

    #[test]
    fn test_weighted_mape_perfect() {
        let actual = vec![3.0, 0.0, 7.5, 1.25];
        let result = weighted_mape(&actual, &actual).unwrap();
        assert_eq!(result, 0.0);
    }

    #[test]
    fn test_weighted_mape_ratio_of_sums() {
        let actual = vec![100.0, 10.0];
        let forecast = vec![110.0, 20.0];
        // Per-point MAPE would be (10% + 100%) / 2 = 55%; WMAPE is 20 / 110
        let result = weighted_mape(&forecast, &actual).unwrap();
        assert_relative_eq!(result, 20.0 / 110.0, epsilon = 1e-12);
    }

    #[test]
    fn test_weighted_mape_scale_invariant() {
        let actual = vec![4.0, 8.0, 15.0, 16.0];
        let forecast = vec![5.0, 7.0, 14.0, 18.0];
        let base = weighted_mape(&forecast, &actual).unwrap();

        for k in [0.5, 3.0, 1000.0] {
            let a: Vec<f64> = actual.iter().map(|v| v * k).collect();
            let f: Vec<f64> = forecast.iter().map(|v| v * k).collect();
            assert_relative_eq!(weighted_mape(&f, &a).unwrap(), base, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_weighted_mape_zero_denominator() {
        // Not guarded: caller's responsibility
        let result = weighted_mape(&[1.0, 1.0], &[1.0, -1.0]).unwrap();
        assert!(result.is_infinite());

        let result = weighted_mape(&[0.0, 0.0], &[0.0, 0.0]).unwrap();
        assert!(result.is_nan());
    }

    #[test]
    fn test_validate_inputs_length_mismatch() {
        let err = weighted_mape(&[1.0, 2.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidInput(_)));
    }

    #[test]
    fn test_validate_inputs_empty() {
        let err = weighted_mape(&[], &[]).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 1, got: 0 });
    }
}
