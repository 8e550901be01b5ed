//! Single-sided FFT magnitude spectrum.
//!
//! For a real-valued series the spectrum is symmetric around N/2, so only bins
//! `1..=floor(N/2) - 1` are returned. The DC bin and the midpoint/mirror
//! region are dropped.

use crate::error::{ForecastError, Result};
use rustfft::{num_complex::Complex64, FftPlanner};

/// Magnitude spectrum of a series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpectralMagnitude {
    /// |X[k]| for each returned bin
    pub magnitudes: Vec<f64>,
    /// Frequency bin index k, starting at 1
    pub bins: Vec<usize>,
    /// Length of the analysed series
    pub n_obs: usize,
}

impl SpectralMagnitude {
    /// Number of returned bins.
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Split into `(magnitudes, bins)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<usize>) {
        (self.magnitudes, self.bins)
    }

    /// Frequency of each bin in cycles per time unit, given the sample spacing.
    pub fn frequencies(&self, spacing: f64) -> Result<Vec<f64>> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(ForecastError::invalid_parameter(
                "spacing",
                spacing,
                "must be a positive number",
            ));
        }
        let span = self.n_obs as f64 * spacing;
        Ok(self.bins.iter().map(|&k| k as f64 / span).collect())
    }

    /// Period (in samples) of each bin: N / k.
    pub fn periods(&self) -> Vec<f64> {
        self.bins
            .iter()
            .map(|&k| self.n_obs as f64 / k as f64)
            .collect()
    }

    /// Bin with the largest magnitude, first one on ties.
    pub fn dominant(&self) -> Option<(usize, f64)> {
        self.bins
            .iter()
            .zip(self.magnitudes.iter())
            .fold(None, |best: Option<(usize, f64)>, (&k, &m)| match best {
                Some((_, best_m)) if best_m >= m => best,
                _ => Some((k, m)),
            })
    }
}

/// Compute the magnitude spectrum of `values`, excluding DC and mirror bins.
///
/// Returns `max(0, floor(N/2) - 1)` magnitudes with their bin indices.
///
/// # Example
/// ```
/// use fusion_fcst_core::spectral::spectral_magnitude;
/// let spectrum = spectral_magnitude(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
/// assert_eq!(spectrum.bins, vec![1, 2, 3]);
/// assert_eq!(spectrum.magnitudes.len(), 3);
/// ```
pub fn spectral_magnitude(values: &[f64]) -> SpectralMagnitude {
    let n = values.len();
    let upper = n / 2;
    if upper < 2 {
        return SpectralMagnitude {
            n_obs: n,
            ..Default::default()
        };
    }

    let mut buffer: Vec<Complex64> = values.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);

    let magnitudes = buffer[1..upper].iter().map(|c| c.norm()).collect();
    let bins = (1..upper).collect();

    SpectralMagnitude {
        magnitudes,
        bins,
        n_obs: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_ramp_of_eight() {
        let y: Vec<f64> = (1..=8).map(|i| i as f64).collect();
        let spectrum = spectral_magnitude(&y);

        assert_eq!(spectrum.bins, vec![1, 2, 3]);
        assert_eq!(spectrum.magnitudes.len(), 3);

        // |X[k]| = 4 / sin(pi k / 8) for a 1..=8 ramp
        for (k, m) in spectrum.bins.iter().zip(spectrum.magnitudes.iter()) {
            let expected = 4.0 / (PI * *k as f64 / 8.0).sin();
            assert_relative_eq!(*m, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_short_series_is_empty() {
        for n in 0..4 {
            let y = vec![1.0; n];
            let spectrum = spectral_magnitude(&y);
            assert!(spectrum.is_empty());
            assert!(spectrum.magnitudes.is_empty());
            assert_eq!(spectrum.n_obs, n);
        }
    }

    #[test]
    fn test_output_length() {
        for n in [4, 5, 9, 10, 31, 64] {
            let y: Vec<f64> = (0..n).map(|i| (i as f64).sqrt()).collect();
            let spectrum = spectral_magnitude(&y);
            assert_eq!(spectrum.len(), n / 2 - 1);
            assert_eq!(spectrum.bins.first(), Some(&1));
            assert_eq!(spectrum.bins.last(), Some(&(n / 2 - 1)));
        }
    }

    #[test]
    fn test_constant_series_has_no_oscillation() {
        let spectrum = spectral_magnitude(&[5.0; 16]);
        assert!(spectrum.magnitudes.iter().all(|m| m.abs() < 1e-9));
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let n = 64;
        let y: Vec<f64> = (0..n)
            .map(|i| 3.0 + 2.0 * (2.0 * PI * 5.0 * i as f64 / n as f64).sin())
            .collect();
        let spectrum = spectral_magnitude(&y);

        let (bin, magnitude) = spectrum.dominant().unwrap();
        assert_eq!(bin, 5);
        // amplitude * N / 2
        assert_relative_eq!(magnitude, 64.0, epsilon = 1e-9);
        assert_relative_eq!(spectrum.periods()[bin - 1], 12.8, epsilon = 1e-12);
    }

    #[test]
    fn test_frequencies() {
        let y: Vec<f64> = (0..10).map(|i| (i % 3) as f64).collect();
        let spectrum = spectral_magnitude(&y);
        let freqs = spectrum.frequencies(0.5).unwrap();
        assert_eq!(freqs.len(), 4);
        assert_relative_eq!(freqs[0], 0.2);
        assert_relative_eq!(freqs[3], 0.8);
        assert!(spectrum.frequencies(0.0).is_err());
    }

    #[test]
    fn test_dominant_empty() {
        assert_eq!(spectral_magnitude(&[1.0, 2.0]).dominant(), None);
    }

    #[test]
    fn test_into_parts() {
        let (mags, bins) = spectral_magnitude(&[0.0, 1.0, 0.0, -1.0, 0.0, 1.0]).into_parts();
        assert_eq!(bins, vec![1, 2]);
        assert_eq!(mags.len(), 2);
    }
}
