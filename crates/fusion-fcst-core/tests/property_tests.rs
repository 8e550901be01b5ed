//! Property-based tests for the forecasting helpers.
//!
//! These tests verify invariants that should hold for all valid inputs,
//! using randomly generated series.

use fusion_fcst_core::{
    forecast_smoothing, spectral_magnitude, weighted_mape, SmoothingOptions, TrendType,
};
use proptest::prelude::*;

/// Strategy for strictly positive series, so sums never vanish.
fn positive_values_strategy(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.1..1000.0_f64, min_len..max_len)
}

/// Strategy for paired forecast/actual series of equal length.
fn paired_strategy() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..50).prop_flat_map(|len| {
        (
            prop::collection::vec(-100.0..100.0_f64, len),
            prop::collection::vec(0.1..100.0_f64, len),
        )
    })
}

proptest! {
    #[test]
    fn wmape_is_zero_for_exact_forecast(y in positive_values_strategy(1, 60)) {
        prop_assert_eq!(weighted_mape(&y, &y).unwrap(), 0.0);
    }

    #[test]
    fn wmape_is_non_negative_for_positive_truth((fcst, truth) in paired_strategy()) {
        let value = weighted_mape(&fcst, &truth).unwrap();
        prop_assert!(value >= 0.0);
    }

    #[test]
    fn wmape_is_scale_invariant(
        (fcst, truth) in paired_strategy(),
        k in 0.01..1000.0_f64,
    ) {
        let base = weighted_mape(&fcst, &truth).unwrap();
        let f: Vec<f64> = fcst.iter().map(|v| v * k).collect();
        let t: Vec<f64> = truth.iter().map(|v| v * k).collect();
        let scaled = weighted_mape(&f, &t).unwrap();
        prop_assert!((scaled - base).abs() <= 1e-9 * base.abs().max(1.0));
    }

    #[test]
    fn spectrum_length_and_bins(y in prop::collection::vec(-50.0..50.0_f64, 0..200)) {
        let spectrum = spectral_magnitude(&y);
        let expected = (y.len() / 2).saturating_sub(1);
        prop_assert_eq!(spectrum.magnitudes.len(), expected);
        prop_assert_eq!(spectrum.bins, (1..=expected).collect::<Vec<_>>());
        prop_assert!(spectrum.magnitudes.iter().all(|m| *m >= 0.0));
    }

    #[test]
    fn smoothing_output_lengths(
        y in positive_values_strategy(2, 40),
        horizon in 0usize..12,
    ) {
        let options = SmoothingOptions {
            trend: TrendType::Additive,
            ..Default::default()
        };
        let result = forecast_smoothing(&y, horizon, 0.9, &options).unwrap();
        prop_assert_eq!(result.historical_fit.len(), y.len());
        prop_assert_eq!(result.future_forecast.len(), horizon);
        prop_assert!(result.future_forecast.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn smoothing_constant_series(c in 0.5..500.0_f64, n in 1usize..30, horizon in 0usize..6) {
        let y = vec![c; n];
        let result = forecast_smoothing(&y, horizon, 0.9, &SmoothingOptions::default()).unwrap();
        for v in result.historical_fit.iter().chain(result.future_forecast.iter()) {
            prop_assert!((v - c).abs() <= 1e-9 * c);
        }
    }
}
