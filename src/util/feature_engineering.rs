// External crates
use polars::prelude::*;

// Internal modules
use crate::constants::{
    DEFAULT_LONG_WINDOW, DEFAULT_RETURN_LAG, DEFAULT_RSI_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::error::PipelineError;

/// Indicator windows used to assemble the feature matrix.
#[derive(Debug, Clone)]
pub struct FeatureParams {
    pub short_window: usize,
    pub long_window: usize,
    pub rsi_window: usize,
    pub return_lag: usize,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            short_window: DEFAULT_SHORT_WINDOW,
            long_window: DEFAULT_LONG_WINDOW,
            rsi_window: DEFAULT_RSI_WINDOW,
            return_lag: DEFAULT_RETURN_LAG,
        }
    }
}

impl FeatureParams {
    /// Number of leading rows without full indicator history.
    ///
    /// SMA leaves `window - 1` undefined rows and RSI leaves `window`;
    /// EMA/MACD are recursively defined from the first sample and lagged
    /// returns are zero-filled below the lag, so neither extends the head.
    pub fn max_lookback(&self) -> usize {
        self.short_window.saturating_sub(1).max(self.rsi_window)
    }
}

/// Calculates Simple Moving Average (SMA)
///
/// Output length is `data.len() - window + 1`; `output[i]` is the mean of
/// `data[i..i + window]`.
pub fn simple_moving_average(data: &[f64], window: usize) -> Result<Vec<f64>, PipelineError> {
    if window == 0 {
        return Err(PipelineError::InvalidParameter(
            "SMA window must be at least 1".to_string(),
        ));
    }
    if window > data.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "SMA window ({}) exceeds data length ({})",
            window,
            data.len()
        )));
    }

    let mut sma = Vec::with_capacity(data.len() - window + 1);
    for i in 0..=(data.len() - window) {
        let sum: f64 = data[i..i + window].iter().sum();
        sma.push(sum / window as f64);
    }
    Ok(sma)
}

/// Calculates Exponential Moving Average (EMA)
///
/// `output[0] = data[0]`, then `output[i] = alpha * data[i] +
/// (1 - alpha) * output[i - 1]`. Alpha near zero degenerates to a
/// near-constant series; that is left to the caller.
pub fn exponential_moving_average(data: &[f64], alpha: f64) -> Result<Vec<f64>, PipelineError> {
    if !(alpha > 0.0 && alpha <= 1.0) {
        return Err(PipelineError::InvalidParameter(format!(
            "EMA alpha must be in (0, 1], got {}",
            alpha
        )));
    }

    let mut ema = Vec::with_capacity(data.len());
    if let Some(&first) = data.first() {
        ema.push(first);
        let mut prev = first;
        for &value in &data[1..] {
            let smoothed = alpha * value + (1.0 - alpha) * prev;
            ema.push(smoothed);
            prev = smoothed;
        }
    }
    Ok(ema)
}

/// Calculates Moving Average Convergence Divergence (MACD)
///
/// Difference of the short and long EMAs with `alpha = 2 / (window + 1)`,
/// both recomputed over the full input, so the result has the same length
/// as `data`.
pub fn macd(
    data: &[f64],
    short_window: usize,
    long_window: usize,
) -> Result<Vec<f64>, PipelineError> {
    if short_window == 0 || long_window == 0 {
        return Err(PipelineError::InvalidParameter(
            "MACD windows must be at least 1".to_string(),
        ));
    }

    let short_ema = exponential_moving_average(data, 2.0 / (short_window as f64 + 1.0))?;
    let long_ema = exponential_moving_average(data, 2.0 / (long_window as f64 + 1.0))?;

    Ok(short_ema
        .iter()
        .zip(long_ema.iter())
        .map(|(s, l)| s - l)
        .collect())
}

/// Calculates lagged percentage returns
///
/// `output[i] = (data[i] - data[i - lag]) / data[i - lag]` for `i >= lag`,
/// zero below the lag. A zero historical price propagates NaN/Inf as a
/// data-quality signal instead of panicking.
pub fn lagged_returns(data: &[f64], lag: usize) -> Result<Vec<f64>, PipelineError> {
    if lag == 0 {
        return Err(PipelineError::InvalidParameter(
            "return lag must be at least 1".to_string(),
        ));
    }
    if lag >= data.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "return lag ({}) exceeds data length ({})",
            lag,
            data.len()
        )));
    }

    let mut returns = vec![0.0; data.len()];
    for i in lag..data.len() {
        returns[i] = (data[i] - data[i - lag]) / data[i - lag];
    }
    Ok(returns)
}

/// Calculates Relative Strength Index (RSI) with Wilder smoothing
///
/// The smoothed averages are seeded with the mean gain/loss over the first
/// `window` deltas and then updated recursively as
/// `avg[i] = (avg[i - 1] * (window - 1) + value[i - 1]) / window`. Entries
/// before index `window` are NaN (insufficient history). A zero smoothed
/// loss yields RSI = 100 rather than a silent NaN.
pub fn relative_strength_index(data: &[f64], window: usize) -> Result<Vec<f64>, PipelineError> {
    if window == 0 {
        return Err(PipelineError::InvalidParameter(
            "RSI window must be at least 1".to_string(),
        ));
    }
    if window >= data.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "RSI window ({}) needs at least {} data points, got {}",
            window,
            window + 1,
            data.len()
        )));
    }

    let n = data.len();
    let mut gains = Vec::with_capacity(n - 1);
    let mut losses = Vec::with_capacity(n - 1);
    for i in 1..n {
        let delta = data[i] - data[i - 1];
        gains.push(delta.max(0.0));
        losses.push((-delta).max(0.0));
    }

    let mut rsi = vec![f64::NAN; n];
    let mut avg_gain: f64 = gains[..window].iter().sum::<f64>() / window as f64;
    let mut avg_loss: f64 = losses[..window].iter().sum::<f64>() / window as f64;
    rsi[window] = rsi_from_averages(avg_gain, avg_loss);

    for i in (window + 1)..n {
        avg_gain = (avg_gain * (window as f64 - 1.0) + gains[i - 1]) / window as f64;
        avg_loss = (avg_loss * (window as f64 - 1.0) + losses[i - 1]) / window as f64;
        rsi[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    Ok(rsi)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

/// Adds the indicator columns to a chronological bar DataFrame
///
/// Computes `sma`, `macd`, `rsi`, and `lag_return` from the close column,
/// stacks them next to the raw bars, and drops the leading rows that lack
/// full indicator history so every surviving row is fully defined.
pub fn add_feature_columns(df: &mut DataFrame, params: &FeatureParams) -> PolarsResult<DataFrame> {
    // Cast the numeric bar columns to Float64 before any indicator math
    let numeric_columns = ["open", "high", "low", "close", "volume"];
    for col_name in numeric_columns {
        let series = df
            .column(col_name)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        df.replace(col_name, series)?;
    }

    let close: Vec<f64> = df
        .column("close")?
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();

    let to_compute_err = |e: PipelineError| PolarsError::ComputeError(e.to_string().into());

    // SMA is shorter than the input by window - 1; pad the head with NaN so
    // all columns stay row-aligned until the joint head drop below
    let mut sma = vec![f64::NAN; params.short_window.saturating_sub(1)];
    sma.extend(simple_moving_average(&close, params.short_window).map_err(to_compute_err)?);

    let macd_line =
        macd(&close, params.short_window, params.long_window).map_err(to_compute_err)?;
    let rsi_line = relative_strength_index(&close, params.rsi_window).map_err(to_compute_err)?;
    let lag_line = lagged_returns(&close, params.return_lag).map_err(to_compute_err)?;

    let indicators = vec![
        Series::new("sma".into(), sma),
        Series::new("macd".into(), macd_line),
        Series::new("rsi".into(), rsi_line),
        Series::new("lag_return".into(), lag_line),
    ];

    let columns: Vec<Column> = indicators.into_iter().map(|s| s.into_column()).collect();
    let stacked = df.hstack(&columns)?;

    let lookback = params.max_lookback();
    if stacked.height() <= lookback {
        return Err(PolarsError::ComputeError(
            format!(
                "need more than {} rows for indicator history, got {}",
                lookback,
                stacked.height()
            )
            .into(),
        ));
    }

    Ok(stacked.slice(lookback as i64, stacked.height() - lookback))
}
