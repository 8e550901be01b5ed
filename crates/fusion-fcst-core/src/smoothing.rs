//! Damped Holt-Winters exponential smoothing.
//!
//! The model is written in error-correction form with optional additive or
//! multiplicative trend and seasonality. Smoothing parameters are estimated by
//! minimising the one-step-ahead sum of squared errors with a bounded
//! Nelder-Mead search; the trend damping coefficient is always supplied by the
//! caller and never estimated.
//!
//! Model equations (`m` = seasonal period, `φ_h = φ + φ² + … + φ^h`):
//!
//! - Trend combine: none `l`, additive `l + φ_h·b`, multiplicative `l·b^φ_h`
//! - One-step fit: `ŷ_t = combine(l_{t-1}, b_{t-1}, φ) ⊕ s_{t-m}`
//! - Level: `l_t = α·deseason(y_t) + (1-α)·combine(l_{t-1}, b_{t-1}, φ)`
//! - Trend (additive): `b_t = β(l_t - l_{t-1}) + (1-β)·φ·b_{t-1}`
//! - Trend (multiplicative): `b_t = β(l_t / l_{t-1}) + (1-β)·b_{t-1}^φ`
//! - Seasonal (additive): `s_t = γ(y_t - l_t) + (1-γ)·s_{t-m}`
//! - Seasonal (multiplicative): `s_t = γ(y_t / l_t) + (1-γ)·s_{t-m}`
//!
//! # Convergence
//!
//! The optimizer stops when either the spread of objective values across the
//! simplex or the simplex diameter drops below
//! [`OptimizerOptions::tolerance`], or after [`OptimizerOptions::max_iter`]
//! iterations. Hitting the iteration limit is not an error: the best vertex
//! found is used, a warning is logged and [`SmoothingFit::converged`] is
//! `false`. Fits are deterministic for identical inputs and options.

use crate::error::{ForecastError, Result};
use anofox_forecast::transform::{boxcox, inv_boxcox};
use anofox_forecast::utils::optimization::{nelder_mead, NelderMeadConfig};
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// Default forecast horizon of [`forecast_smoothing`].
pub const DEFAULT_HORIZON: usize = 1;

/// Default trend damping coefficient of [`forecast_smoothing`].
pub const DEFAULT_DAMPING_SLOPE: f64 = 0.9;

/// Bounds applied to every estimated smoothing parameter.
const PARAM_BOUNDS: (f64, f64) = (0.0001, 0.9999);

/// Starting values (alpha, beta, gamma) when no grid search is performed.
const DEFAULT_START: [f64; 3] = [0.3, 0.1, 0.1];

/// Grid searched per smoothing parameter when `use_brute` is enabled.
const BRUTE_GRID: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

const EPS: f64 = 1e-10;

/// Trend component of the smoothing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrendType {
    /// No trend.
    #[default]
    None,
    /// Additive trend: level + slope.
    Additive,
    /// Multiplicative trend: level * growth rate.
    Multiplicative,
}

impl TrendType {
    /// Returns the canonical component name.
    pub fn name(&self) -> &'static str {
        match self {
            TrendType::None => "None",
            TrendType::Additive => "Additive",
            TrendType::Multiplicative => "Multiplicative",
        }
    }

    fn is_present(&self) -> bool {
        !matches!(self, TrendType::None)
    }
}

impl FromStr for TrendType {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "None" => return Ok(TrendType::None),
            "Additive" => return Ok(TrendType::Additive),
            "Multiplicative" => return Ok(TrendType::Multiplicative),
            _ => {}
        }

        match s.trim().to_lowercase().as_str() {
            "" | "none" | "n" => Ok(TrendType::None),
            "add" | "additive" | "a" => Ok(TrendType::Additive),
            "mul" | "multiplicative" | "m" => Ok(TrendType::Multiplicative),
            _ => Err(ForecastError::invalid_parameter(
                "trend",
                s,
                "expected one of: none, add, mul",
            )),
        }
    }
}

/// Seasonal component of the smoothing model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonalType {
    /// No seasonality.
    #[default]
    None,
    /// Additive seasonality: y = base + s.
    Additive,
    /// Multiplicative seasonality: y = base * s.
    Multiplicative,
}

impl SeasonalType {
    /// Returns the canonical component name.
    pub fn name(&self) -> &'static str {
        match self {
            SeasonalType::None => "None",
            SeasonalType::Additive => "Additive",
            SeasonalType::Multiplicative => "Multiplicative",
        }
    }

    fn is_present(&self) -> bool {
        !matches!(self, SeasonalType::None)
    }
}

impl FromStr for SeasonalType {
    type Err = ForecastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "None" => return Ok(SeasonalType::None),
            "Additive" => return Ok(SeasonalType::Additive),
            "Multiplicative" => return Ok(SeasonalType::Multiplicative),
            _ => {}
        }

        match s.trim().to_lowercase().as_str() {
            "" | "none" | "n" => Ok(SeasonalType::None),
            "add" | "additive" | "a" => Ok(SeasonalType::Additive),
            "mul" | "multiplicative" | "m" => Ok(SeasonalType::Multiplicative),
            _ => Err(ForecastError::invalid_parameter(
                "seasonal",
                s,
                "expected one of: none, add, mul",
            )),
        }
    }
}

/// Level, trend and seasonal states of the model.
///
/// `trend` is 0 when the model has no trend component and `seasonal` is empty
/// when the model has no seasonal component. States live on the fitting scale,
/// i.e. after the Box-Cox transform when one is configured.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SmoothingState {
    pub level: f64,
    pub trend: f64,
    pub seasonal: Vec<f64>,
}

/// How the initial states are obtained.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Initialization {
    /// Derived from the first one (or two) seasons of data.
    #[default]
    Heuristic,
    /// Heuristic start, then level and trend are estimated together with the
    /// smoothing parameters.
    Estimated,
    /// Supplied by the caller.
    Known(SmoothingState),
}

/// Optimizer settings for parameter estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    /// Maximum number of Nelder-Mead iterations.
    pub max_iter: usize,
    /// Convergence tolerance on objective spread and simplex size.
    pub tolerance: f64,
    /// Start from the best point of a coarse grid instead of fixed defaults.
    pub use_brute: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            tolerance: 1e-8,
            use_brute: true,
        }
    }
}

/// Exponential smoothing model configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingOptions {
    /// Trend component
    pub trend: TrendType,
    /// Apply the damping coefficient to the trend (ignored without trend)
    pub damped_trend: bool,
    /// Seasonal component
    pub seasonal: SeasonalType,
    /// Seasonal period, required when `seasonal` is not `None`
    pub seasonal_periods: Option<usize>,
    /// Initial state strategy
    pub initialization: Initialization,
    /// Fixed level smoothing (alpha); `None` means estimate
    pub smoothing_level: Option<f64>,
    /// Fixed trend smoothing (beta); `None` means estimate
    pub smoothing_trend: Option<f64>,
    /// Fixed seasonal smoothing (gamma); `None` means estimate
    pub smoothing_seasonal: Option<f64>,
    /// Box-Cox lambda applied before fitting (0 = log)
    pub boxcox_lambda: Option<f64>,
    /// Shift predictions by the mean in-sample residual
    pub remove_bias: bool,
    /// Optimizer settings
    pub optimizer: OptimizerOptions,
}

impl Default for SmoothingOptions {
    fn default() -> Self {
        Self {
            trend: TrendType::None,
            damped_trend: true,
            seasonal: SeasonalType::None,
            seasonal_periods: None,
            initialization: Initialization::Heuristic,
            smoothing_level: None,
            smoothing_trend: None,
            smoothing_seasonal: None,
            boxcox_lambda: None,
            remove_bias: false,
            optimizer: OptimizerOptions::default(),
        }
    }
}

impl SmoothingOptions {
    /// Validate every setting that does not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if self.seasonal.is_present() {
            match self.seasonal_periods {
                Some(m) if m >= 2 => {}
                Some(m) => {
                    return Err(ForecastError::invalid_parameter(
                        "seasonal_periods",
                        m,
                        "must be at least 2",
                    ))
                }
                None => {
                    return Err(ForecastError::invalid_parameter(
                        "seasonal_periods",
                        "None",
                        "required when a seasonal component is configured",
                    ))
                }
            }
        }

        for (name, value) in [
            ("smoothing_level", self.smoothing_level),
            ("smoothing_trend", self.smoothing_trend),
            ("smoothing_seasonal", self.smoothing_seasonal),
        ] {
            if let Some(v) = value {
                if !(0.0..=1.0).contains(&v) {
                    return Err(ForecastError::invalid_parameter(
                        name,
                        v,
                        "must be within [0, 1]",
                    ));
                }
            }
        }

        if let Some(lambda) = self.boxcox_lambda {
            if !lambda.is_finite() {
                return Err(ForecastError::invalid_parameter(
                    "boxcox_lambda",
                    lambda,
                    "must be finite",
                ));
            }
        }

        if self.optimizer.max_iter == 0 {
            return Err(ForecastError::invalid_parameter(
                "max_iter",
                0,
                "must be at least 1",
            ));
        }
        if !(self.optimizer.tolerance.is_finite() && self.optimizer.tolerance > 0.0) {
            return Err(ForecastError::invalid_parameter(
                "tolerance",
                self.optimizer.tolerance,
                "must be a positive number",
            ));
        }

        if let Initialization::Known(state) = &self.initialization {
            if !state.level.is_finite() || !state.trend.is_finite() {
                return Err(ForecastError::invalid_parameter(
                    "initialization",
                    format!("level={}, trend={}", state.level, state.trend),
                    "initial level and trend must be finite",
                ));
            }
            let expected = self.period();
            if state.seasonal.len() != expected {
                return Err(ForecastError::invalid_parameter(
                    "initialization",
                    format!("{} seasonal states", state.seasonal.len()),
                    format!("expected {} seasonal states", expected),
                ));
            }
        }

        Ok(())
    }

    /// Seasonal period in effect, 0 when there is no seasonal component.
    fn period(&self) -> usize {
        if self.seasonal.is_present() {
            self.seasonal_periods.unwrap_or(0)
        } else {
            0
        }
    }

    /// Minimum number of observations the configuration needs.
    pub fn min_observations(&self) -> usize {
        if self.seasonal.is_present() {
            2 * self.period()
        } else if self.trend.is_present() {
            2
        } else {
            1
        }
    }
}

/// A fitted exponential smoothing model.
#[derive(Debug, Clone)]
pub struct SmoothingFit {
    /// Level smoothing parameter
    pub alpha: f64,
    /// Trend smoothing parameter (trend models only)
    pub beta: Option<f64>,
    /// Seasonal smoothing parameter (seasonal models only)
    pub gamma: Option<f64>,
    /// Damping coefficient (damped trend models only)
    pub phi: Option<f64>,
    /// Trend component
    pub trend: TrendType,
    /// Seasonal component
    pub seasonal: SeasonalType,
    /// States before the first observation
    pub initial_state: SmoothingState,
    /// States after the last observation
    pub final_state: SmoothingState,
    /// In-sample one-step-ahead fitted values
    pub fitted: Vec<f64>,
    /// Residuals (observed - fitted)
    pub residuals: Vec<f64>,
    /// Sum of squared one-step errors on the fitting scale
    pub sse: f64,
    /// Akaike information criterion
    pub aic: f64,
    /// Bayesian information criterion
    pub bic: f64,
    /// Optimizer iterations
    pub iterations: usize,
    /// Whether the optimizer met its tolerance
    pub converged: bool,
    damping: f64,
    boxcox_lambda: Option<f64>,
    bias: f64,
}

impl SmoothingFit {
    /// Number of observations the model was fitted on.
    pub fn n_obs(&self) -> usize {
        self.fitted.len()
    }

    /// Compact ETS-style model name, e.g. `ETS(A,Ad,M)`.
    pub fn model_name(&self) -> String {
        let trend = match (self.trend, self.phi.is_some()) {
            (TrendType::None, _) => "N",
            (TrendType::Additive, false) => "A",
            (TrendType::Additive, true) => "Ad",
            (TrendType::Multiplicative, false) => "M",
            (TrendType::Multiplicative, true) => "Md",
        };
        let seasonal = match self.seasonal {
            SeasonalType::None => "N",
            SeasonalType::Additive => "A",
            SeasonalType::Multiplicative => "M",
        };
        format!("ETS(A,{},{})", trend, seasonal)
    }

    /// Out-of-sample forecasts for horizons 1..=horizon.
    pub fn forecast(&self, horizon: usize) -> Vec<f64> {
        let n = self.n_obs();
        let state = &self.final_state;
        let period = state.seasonal.len();

        let transformed: Vec<f64> = (1..=horizon)
            .map(|h| {
                let base = combine_trend(
                    self.trend,
                    state.level,
                    state.trend,
                    damped_sum(self.damping, h),
                );
                let s = if period > 0 {
                    state.seasonal[(n + h - 1) % period]
                } else {
                    0.0
                };
                combine_seasonal(self.seasonal, base, s)
            })
            .collect();

        to_original_scale(transformed, self.boxcox_lambda)
            .into_iter()
            .map(|v| v + self.bias)
            .collect()
    }

    /// Predictions for the inclusive index range `[start, end]`.
    ///
    /// Indices below the series length are in-sample fitted values; index
    /// `n_obs() + h - 1` is the out-of-sample forecast at horizon `h`.
    pub fn predict(&self, start: usize, end: usize) -> Result<Vec<f64>> {
        if start > end {
            return Err(ForecastError::InvalidInput(format!(
                "Prediction start ({}) must not exceed end ({})",
                start, end
            )));
        }

        let stop = end.checked_add(1).ok_or_else(|| {
            ForecastError::InvalidInput(format!("Prediction end ({}) is out of range", end))
        })?;

        let n = self.n_obs();
        let mut out = Vec::new();
        if start < n {
            out.extend_from_slice(&self.fitted[start..stop.min(n)]);
        }

        let horizon = stop.saturating_sub(n);
        if horizon > 0 {
            let ahead = self.forecast(horizon);
            out.extend_from_slice(&ahead[start.saturating_sub(n)..]);
        }

        Ok(out)
    }

    /// Predict `0..=n_obs() + horizon - 1` and split it at the series end.
    pub fn split_predictions(&self, horizon: usize) -> Result<SmoothingForecast> {
        let n = self.n_obs();
        if n == 0 {
            return Err(ForecastError::InsufficientData { needed: 1, got: 0 });
        }

        let stop = n.checked_add(horizon).ok_or_else(|| {
            ForecastError::InvalidInput(format!("Forecast horizon ({}) is out of range", horizon))
        })?;

        let mut historical_fit = self.predict(0, stop - 1)?;
        let future_forecast = historical_fit.split_off(n);

        Ok(SmoothingForecast {
            historical_fit,
            future_forecast,
        })
    }
}

/// In-sample fit and out-of-sample forecast of [`forecast_smoothing`].
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingForecast {
    /// Fitted values aligned 1:1 with the input series
    pub historical_fit: Vec<f64>,
    /// Forecasts for the requested horizon
    pub future_forecast: Vec<f64>,
}

impl SmoothingForecast {
    /// Split into `(historical_fit, future_forecast)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.historical_fit, self.future_forecast)
    }
}

/// Fit a damped exponential smoothing model and predict `outpush` steps ahead.
///
/// Predictions cover indices `0..=N + outpush - 1`; the first `N` are the
/// in-sample fit and the remaining `outpush` are forecasts.
///
/// # Example
/// ```
/// use fusion_fcst_core::smoothing::{forecast_smoothing, SmoothingOptions};
/// let y = vec![5.0; 12];
/// let result = forecast_smoothing(&y, 3, 0.9, &SmoothingOptions::default()).unwrap();
/// assert_eq!(result.historical_fit.len(), 12);
/// assert_eq!(result.future_forecast.len(), 3);
/// assert!((result.future_forecast[0] - 5.0).abs() < 1e-9);
/// ```
pub fn forecast_smoothing(
    y: &[f64],
    outpush: usize,
    damping_slope: f64,
    options: &SmoothingOptions,
) -> Result<SmoothingForecast> {
    fit_smoothing(y, damping_slope, options)?.split_predictions(outpush)
}

/// Fit an exponential smoothing model with a fixed damping coefficient.
pub fn fit_smoothing(
    y: &[f64],
    damping_slope: f64,
    options: &SmoothingOptions,
) -> Result<SmoothingFit> {
    options.validate()?;

    if !(damping_slope.is_finite() && (0.0..=1.0).contains(&damping_slope)) {
        return Err(ForecastError::invalid_parameter(
            "damping_slope",
            damping_slope,
            "must be within [0, 1]",
        ));
    }

    let needed = options.min_observations();
    if y.len() < needed {
        return Err(ForecastError::InsufficientData {
            needed,
            got: y.len(),
        });
    }

    if let Some(i) = y.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "Series contains a non-finite value at index {}",
            i
        )));
    }

    let values = match options.boxcox_lambda {
        Some(lambda) => {
            require_positive(y, "Box-Cox transform")?;
            boxcox(y, lambda)
        }
        None => y.to_vec(),
    };

    if options.trend == TrendType::Multiplicative {
        require_positive(&values, "multiplicative trend")?;
    }
    if options.seasonal == SeasonalType::Multiplicative {
        require_positive(&values, "multiplicative seasonality")?;
    }

    let components = Components {
        trend: options.trend,
        seasonal: options.seasonal,
        period: options.period(),
    };
    let damping = if options.trend.is_present() && options.damped_trend {
        damping_slope
    } else {
        1.0
    };

    let base_state = match &options.initialization {
        Initialization::Known(state) => state.clone(),
        Initialization::Heuristic | Initialization::Estimated => {
            heuristic_state(&values, &components)
        }
    };

    let problem = Problem {
        values: &values,
        components,
        damping,
        fixed: [
            options.smoothing_level,
            options.smoothing_trend,
            options.smoothing_seasonal,
        ],
        base_state,
        estimate_state: options.initialization == Initialization::Estimated,
    };

    let (point, iterations, converged) = problem.optimize(&options.optimizer);
    let (params, initial_state) = problem.unpack(&point);
    let run = run_filter(&values, &components, &params, damping, &initial_state);

    if !run.sse.is_finite() {
        return Err(ForecastError::ComputationError(format!(
            "Model produced a non-finite sum of squared errors (alpha={:.4}, beta={:.4}, gamma={:.4})",
            params.alpha, params.beta, params.gamma
        )));
    }

    if !converged {
        warn!(
            iterations,
            sse = run.sse,
            "Holt-Winters optimizer stopped before reaching tolerance"
        );
    }

    let mut fitted = to_original_scale(run.fitted.clone(), options.boxcox_lambda);

    let bias = if options.remove_bias {
        y.iter().zip(fitted.iter()).map(|(a, f)| a - f).sum::<f64>() / y.len() as f64
    } else {
        0.0
    };
    for f in fitted.iter_mut() {
        *f += bias;
    }
    let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, f)| a - f).collect();

    let n = y.len() as f64;
    let k = (problem.free_indices().len()
        + 1
        + usize::from(components.trend.is_present())
        + components.period) as f64;
    let log_lik_term = n * (run.sse / n).ln();
    let aic = log_lik_term + 2.0 * k;
    let bic = log_lik_term + k * n.ln();

    let fit = SmoothingFit {
        alpha: params.alpha,
        beta: components.trend.is_present().then_some(params.beta),
        gamma: components.seasonal.is_present().then_some(params.gamma),
        phi: (components.trend.is_present() && options.damped_trend).then_some(damping_slope),
        trend: components.trend,
        seasonal: components.seasonal,
        initial_state,
        final_state: run.state,
        fitted,
        residuals,
        sse: run.sse,
        aic,
        bic,
        iterations,
        converged,
        damping,
        boxcox_lambda: options.boxcox_lambda,
        bias,
    };

    debug!(
        model = %fit.model_name(),
        alpha = fit.alpha,
        beta = ?fit.beta,
        gamma = ?fit.gamma,
        phi = ?fit.phi,
        sse = fit.sse,
        iterations,
        "fitted Holt-Winters model"
    );

    Ok(fit)
}

fn require_positive(values: &[f64], what: &str) -> Result<()> {
    if let Some(i) = values.iter().position(|&v| v <= 0.0) {
        return Err(ForecastError::InvalidInput(format!(
            "{} requires strictly positive data, found {} at index {}",
            what, values[i], i
        )));
    }
    Ok(())
}

/// Values outside the inverse Box-Cox domain come back as NaN.
fn to_original_scale(values: Vec<f64>, lambda: Option<f64>) -> Vec<f64> {
    match lambda {
        Some(l) => inv_boxcox(&values, l),
        None => values,
    }
}

/// Damped sum φ + φ² + … + φ^h.
fn damped_sum(phi: f64, h: usize) -> f64 {
    if (phi - 1.0).abs() < EPS {
        h as f64
    } else {
        phi * (1.0 - phi.powf(h as f64)) / (1.0 - phi)
    }
}

fn combine_trend(trend: TrendType, level: f64, slope: f64, phi_h: f64) -> f64 {
    match trend {
        TrendType::None => level,
        TrendType::Additive => level + phi_h * slope,
        TrendType::Multiplicative => level * slope.powf(phi_h),
    }
}

fn combine_seasonal(seasonal: SeasonalType, base: f64, s: f64) -> f64 {
    match seasonal {
        SeasonalType::None => base,
        SeasonalType::Additive => base + s,
        SeasonalType::Multiplicative => base * s,
    }
}

#[derive(Debug, Clone, Copy)]
struct Components {
    trend: TrendType,
    seasonal: SeasonalType,
    period: usize,
}

#[derive(Debug, Clone, Copy)]
struct Params {
    alpha: f64,
    beta: f64,
    gamma: f64,
}

struct FilterRun {
    fitted: Vec<f64>,
    sse: f64,
    state: SmoothingState,
}

/// Run the smoothing recursions over the whole series.
fn run_filter(
    values: &[f64],
    components: &Components,
    params: &Params,
    phi: f64,
    initial: &SmoothingState,
) -> FilterRun {
    let Params { alpha, beta, gamma } = *params;
    let period = components.period;

    let mut level = initial.level;
    let mut slope = initial.trend;
    let mut seasonal = initial.seasonal.clone();
    let mut fitted = Vec::with_capacity(values.len());
    let mut sse = 0.0;

    for (t, &y) in values.iter().enumerate() {
        let s = if period > 0 { seasonal[t % period] } else { 0.0 };
        let base = combine_trend(components.trend, level, slope, phi);
        let forecast = combine_seasonal(components.seasonal, base, s);
        let error = y - forecast;
        sse += error * error;
        fitted.push(forecast);

        let deseasonalized = match components.seasonal {
            SeasonalType::None => y,
            SeasonalType::Additive => y - s,
            SeasonalType::Multiplicative => {
                if s.abs() > EPS {
                    y / s
                } else {
                    y
                }
            }
        };

        let level_prev = level;
        level = alpha * deseasonalized + (1.0 - alpha) * base;

        slope = match components.trend {
            TrendType::None => 0.0,
            TrendType::Additive => beta * (level - level_prev) + (1.0 - beta) * phi * slope,
            TrendType::Multiplicative => {
                let growth = if level_prev.abs() > EPS {
                    level / level_prev
                } else {
                    slope
                };
                beta * growth + (1.0 - beta) * slope.powf(phi)
            }
        };

        if period > 0 {
            seasonal[t % period] = match components.seasonal {
                SeasonalType::None => s,
                SeasonalType::Additive => gamma * (y - level) + (1.0 - gamma) * s,
                SeasonalType::Multiplicative => {
                    if level.abs() > EPS {
                        gamma * (y / level) + (1.0 - gamma) * s
                    } else {
                        s
                    }
                }
            };
        }
    }

    FilterRun {
        fitted,
        sse,
        state: SmoothingState {
            level,
            trend: slope,
            seasonal,
        },
    }
}

/// Initial states from the first one or two seasons of data.
fn heuristic_state(values: &[f64], components: &Components) -> SmoothingState {
    let m = components.period;

    if m == 0 {
        let level = values[0];
        let trend = match components.trend {
            TrendType::None => 0.0,
            TrendType::Additive => values[1] - values[0],
            TrendType::Multiplicative => values[1] / values[0],
        };
        return SmoothingState {
            level,
            trend,
            seasonal: Vec::new(),
        };
    }

    let first = &values[..m];
    let second = &values[m..2 * m];
    let level = first.iter().sum::<f64>() / m as f64;

    let trend = match components.trend {
        TrendType::None => 0.0,
        TrendType::Additive => {
            first
                .iter()
                .zip(second.iter())
                .map(|(a, b)| (b - a) / m as f64)
                .sum::<f64>()
                / m as f64
        }
        TrendType::Multiplicative => {
            let next_level = second.iter().sum::<f64>() / m as f64;
            (next_level / level).powf(1.0 / m as f64)
        }
    };

    let mut seasonal: Vec<f64> = match components.seasonal {
        SeasonalType::Multiplicative => first
            .iter()
            .map(|y| if level.abs() > EPS { y / level } else { 1.0 })
            .collect(),
        _ => first.iter().map(|y| y - level).collect(),
    };
    normalize_seasonal(&mut seasonal, components.seasonal);

    SmoothingState {
        level,
        trend,
        seasonal,
    }
}

/// Additive indices sum to 0, multiplicative indices average to 1.
fn normalize_seasonal(seasonal: &mut [f64], kind: SeasonalType) {
    if seasonal.is_empty() {
        return;
    }
    let mean = seasonal.iter().sum::<f64>() / seasonal.len() as f64;
    match kind {
        SeasonalType::Multiplicative => {
            if mean.abs() > EPS {
                seasonal.iter_mut().for_each(|s| *s /= mean);
            }
        }
        _ => seasonal.iter_mut().for_each(|s| *s -= mean),
    }
}

/// Parameter estimation problem: free smoothing parameters first, then the
/// optional initial level and trend.
struct Problem<'a> {
    values: &'a [f64],
    components: Components,
    damping: f64,
    fixed: [Option<f64>; 3],
    base_state: SmoothingState,
    estimate_state: bool,
}

impl Problem<'_> {
    /// Indices (0 = alpha, 1 = beta, 2 = gamma) of the parameters to estimate.
    fn free_indices(&self) -> Vec<usize> {
        let present = [
            true,
            self.components.trend.is_present(),
            self.components.seasonal.is_present(),
        ];
        (0..3)
            .filter(|&i| present[i] && self.fixed[i].is_none())
            .collect()
    }

    fn unpack(&self, point: &[f64]) -> (Params, SmoothingState) {
        let free = self.free_indices();
        let mut smoothing = [
            self.fixed[0].unwrap_or(DEFAULT_START[0]),
            self.fixed[1].unwrap_or(0.0),
            self.fixed[2].unwrap_or(0.0),
        ];
        for (slot, &idx) in free.iter().enumerate() {
            smoothing[idx] = point[slot].clamp(PARAM_BOUNDS.0, PARAM_BOUNDS.1);
        }

        let mut state = self.base_state.clone();
        if self.estimate_state {
            state.level = point[free.len()];
            if self.components.trend.is_present() {
                state.trend = point[free.len() + 1];
            }
        }

        let params = Params {
            alpha: smoothing[0],
            beta: smoothing[1],
            gamma: smoothing[2],
        };
        (params, state)
    }

    fn sse(&self, point: &[f64]) -> f64 {
        let (params, state) = self.unpack(point);
        let sse = run_filter(self.values, &self.components, &params, self.damping, &state).sse;
        if sse.is_finite() {
            sse
        } else {
            f64::MAX
        }
    }

    fn start_point(&self, use_brute: bool) -> Vec<f64> {
        let free = self.free_indices();
        let mut start: Vec<f64> = free.iter().map(|&i| DEFAULT_START[i]).collect();

        if use_brute && !free.is_empty() {
            let mut best = f64::INFINITY;
            let mut candidate = vec![0.0; free.len()];
            let total = BRUTE_GRID.len().pow(free.len() as u32);
            for code in 0..total {
                let mut rest = code;
                for c in candidate.iter_mut() {
                    *c = BRUTE_GRID[rest % BRUTE_GRID.len()];
                    rest /= BRUTE_GRID.len();
                }
                let sse = self.sse(&self.with_state(&candidate));
                if sse < best {
                    best = sse;
                    start.copy_from_slice(&candidate);
                }
            }
            trace!(start = ?start, sse = best, "grid search start point");
        }

        self.with_state(&start)
    }

    /// Append the initial level/trend to a smoothing vector when they are estimated.
    fn with_state(&self, smoothing: &[f64]) -> Vec<f64> {
        let mut point = smoothing.to_vec();
        if self.estimate_state {
            point.push(self.base_state.level);
            if self.components.trend.is_present() {
                point.push(self.base_state.trend);
            }
        }
        point
    }

    /// Returns the optimal point, the iteration count and the convergence flag.
    fn optimize(&self, options: &OptimizerOptions) -> (Vec<f64>, usize, bool) {
        let start = self.start_point(options.use_brute);
        if start.is_empty() {
            return (start, 0, true);
        }

        let bounds = vec![PARAM_BOUNDS; self.free_indices().len()];
        let config = NelderMeadConfig {
            max_iter: options.max_iter,
            tolerance: options.tolerance,
            ..Default::default()
        };

        let result = nelder_mead(|p| self.sse(p), &start, Some(bounds.as_slice()), config);
        (result.optimal_point, result.iterations, result.converged)
    }
}
