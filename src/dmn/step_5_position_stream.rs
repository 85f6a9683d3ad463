// External imports
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;
use ndarray::Array1;
use num_traits::cast::NumCast;
use serde::{Deserialize, Serialize};

// Internal imports
use super::step_3_dmn_model_arch::DeepMomentumModel;
use crate::metrics::numeric_series::NumericSeries;
use crate::metrics::risk;

/// Runs the model over a batch of windows and drains the bounded positions
/// into an ordered stream.
pub fn generate_positions<B: Backend>(
    model: &DeepMomentumModel<B>,
    features: Tensor<B, 3>,
) -> Vec<f64> {
    let positions = model.forward_positions(features);
    let data = positions.to_data().convert::<f32>();
    let slice = data.as_slice::<f32>().unwrap();
    slice
        .iter()
        .map(|&v| <f64 as NumCast>::from(v).unwrap_or(f64::NAN))
        .collect()
}

/// Strategy returns: position times the next-bar market return, truncated
/// to the shorter of the two streams.
pub fn strategy_returns(positions: &[f64], market_returns: &[f64]) -> Array1<f64> {
    let n = positions.len().min(market_returns.len());
    Array1::from_iter((0..n).map(|i| positions[i] * market_returns[i]))
}

/// Evaluation summary of a position stream against realized market returns.
///
/// Undefined statistics surface as NaN, mirroring the sentinel policy of
/// the metric functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub beta: f64,
    pub alpha: f64,
}

/// Computes the full metric set on the array backend.
pub fn performance_report(
    positions: &[f64],
    market_returns: &[f64],
    risk_free_rate: f64,
) -> PerformanceReport {
    let strategy = strategy_returns(positions, market_returns);
    let market = Array1::from_iter(market_returns.iter().copied());

    PerformanceReport {
        sharpe: risk::sharpe_ratio(&strategy, risk_free_rate).read_scalar(),
        sortino: risk::sortino_ratio(&strategy, risk_free_rate).read_scalar(),
        max_drawdown: risk::max_drawdown(&strategy).read_scalar(),
        beta: risk::beta(&strategy, &market).read_scalar(),
        alpha: risk::alpha(&strategy, &market, risk_free_rate).read_scalar(),
    }
}
