// External imports
use burn::tensor::Tensor;
use burn_ndarray::{NdArray, NdArrayDevice};
use ndarray::Array1;

// Internal imports
use crate::metrics::numeric_series::NumericSeries;
use crate::metrics::risk::{alpha, beta, max_drawdown, sharpe_ratio, sortino_ratio};

type TestBackend = NdArray<f32>;

fn array_series(values: &[f64]) -> Array1<f64> {
    Array1::from_iter(values.iter().copied())
}

fn tensor_series(values: &[f64]) -> Tensor<TestBackend, 1> {
    let device = NdArrayDevice::Cpu;
    let floats: Vec<f32> = values.iter().map(|&v| v as f32).collect();
    Tensor::from_floats(floats.as_slice(), &device)
}

#[test]
fn sharpe_of_a_constant_series_is_undefined() {
    // 0.25 is exactly representable, so the deviation is exactly zero on
    // both backends
    let constant = [0.25; 8];

    let array_result = sharpe_ratio(&array_series(&constant), 0.0);
    assert!(array_result.read_scalar().is_nan());

    let tensor_result = sharpe_ratio(&tensor_series(&constant), 0.0);
    assert!(tensor_result.read_scalar().is_nan());
}

#[test]
fn sharpe_matches_hand_computation() {
    let returns = [0.1, -0.1, 0.3, -0.05];
    let rf = 0.05;

    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();
    let mean = excess.iter().sum::<f64>() / 4.0;
    let var = excess.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / 4.0;
    let expected = mean / var.sqrt();

    let result = sharpe_ratio(&array_series(&returns), rf).read_scalar();
    assert!((result - expected).abs() < 1e-12);
}

#[test]
fn sortino_denominator_is_the_downside_only_deviation() {
    let returns = [0.1, -0.2, 0.05, -0.1];
    let rf = 0.0;

    // The downside vector keeps full length, with zeros above the baseline
    let downside = [0.0, -0.2, 0.0, -0.1];
    let downside_mean = downside.iter().sum::<f64>() / 4.0;
    let downside_std = (downside
        .iter()
        .map(|d| (d - downside_mean) * (d - downside_mean))
        .sum::<f64>()
        / 4.0)
        .sqrt();
    let excess_mean = returns.iter().sum::<f64>() / 4.0;
    let expected = excess_mean / downside_std;

    let array_result = sortino_ratio(&array_series(&returns), rf).read_scalar();
    assert!((array_result - expected).abs() < 1e-12);

    let tensor_result = sortino_ratio(&tensor_series(&returns), rf).read_scalar();
    assert!((tensor_result - expected).abs() < 1e-5);
}

#[test]
fn sortino_with_no_downside_is_undefined() {
    let returns = [0.5, 0.25, 0.75];

    assert!(sortino_ratio(&array_series(&returns), 0.0)
        .read_scalar()
        .is_nan());
    assert!(sortino_ratio(&tensor_series(&returns), 0.0)
        .read_scalar()
        .is_nan());
}

#[test]
fn max_drawdown_of_monotonic_gains_is_zero() {
    let returns = [0.01, 0.02, 0.03, 0.005];

    let array_result = max_drawdown(&array_series(&returns)).read_scalar();
    assert_eq!(array_result, 0.0);

    let tensor_result = max_drawdown(&tensor_series(&returns)).read_scalar();
    assert!(tensor_result.abs() < 1e-7);
}

#[test]
fn max_drawdown_follows_the_wealth_path() {
    // wealth = [1.1, 0.55, 0.605], peak = 1.1 throughout,
    // drawdown = [0, 0.5, 0.45]
    let returns = [0.1, -0.5, 0.1];

    let array_result = max_drawdown(&array_series(&returns)).read_scalar();
    assert!((array_result - 0.5).abs() < 1e-12);

    let tensor_result = max_drawdown(&tensor_series(&returns)).read_scalar();
    assert!((tensor_result - 0.5).abs() < 1e-6);
}

#[test]
fn max_drawdown_with_wiped_out_wealth_is_undefined() {
    // A -100% return drives wealth to zero; the ratio is undefined
    let returns = [-1.0, 0.5];
    assert!(max_drawdown(&array_series(&returns)).read_scalar().is_nan());
}

#[test]
fn beta_and_alpha_truncate_to_the_common_prefix() {
    let returns = [
        0.03, -0.01, 0.04, 0.00, -0.02, 0.05, 0.01, 0.08, -0.04, 0.02,
    ];
    let market = [0.02, -0.02, 0.03, 0.01, -0.01, 0.04, 0.02];

    let full = array_series(&returns);
    let truncated = array_series(&returns[..market.len()]);
    let market_series = array_series(&market);

    let beta_full = beta(&full, &market_series).read_scalar();
    let beta_truncated = beta(&truncated, &market_series).read_scalar();
    assert!((beta_full - beta_truncated).abs() < 1e-12);

    let alpha_full = alpha(&full, &market_series, 0.01).read_scalar();
    let alpha_truncated = alpha(&truncated, &market_series, 0.01).read_scalar();
    assert!((alpha_full - alpha_truncated).abs() < 1e-12);
}

#[test]
fn beta_matches_hand_computation_on_aligned_series() {
    let returns = [0.02, -0.01, 0.03, 0.01];
    let market = [0.01, -0.02, 0.02, 0.015];

    let r_mean = returns.iter().sum::<f64>() / 4.0;
    let m_mean = market.iter().sum::<f64>() / 4.0;
    let cov = returns
        .iter()
        .zip(market.iter())
        .map(|(r, m)| (r - r_mean) * (m - m_mean))
        .sum::<f64>()
        / 4.0;
    let m_var = market.iter().map(|m| (m - m_mean) * (m - m_mean)).sum::<f64>() / 4.0;
    let expected = cov / m_var;

    let result = beta(&array_series(&returns), &array_series(&market)).read_scalar();
    assert!((result - expected).abs() < 1e-12);
}

#[test]
fn beta_with_flat_market_is_undefined() {
    let returns = [0.02, -0.01, 0.03];
    // 0.25 is exact in binary, so the f32 market variance is exactly zero
    let market = [0.25, 0.25, 0.25];

    assert!(beta(&array_series(&returns), &array_series(&market))
        .read_scalar()
        .is_nan());
    assert!(beta(&tensor_series(&returns), &tensor_series(&market))
        .read_scalar()
        .is_nan());
}

#[test]
fn alpha_propagates_an_undefined_beta() {
    let returns = [0.02, -0.01, 0.03];
    let market = [0.25, 0.25, 0.25];

    assert!(alpha(&array_series(&returns), &array_series(&market), 0.0)
        .read_scalar()
        .is_nan());
}

#[test]
fn both_backends_agree_on_every_metric() {
    let returns = [0.03, -0.01, 0.04, 0.00, -0.02, 0.05, 0.01];
    let market = [0.02, -0.02, 0.03, 0.01, -0.01];
    let rf = 0.01;

    let r_array = array_series(&returns);
    let m_array = array_series(&market);
    let r_tensor = tensor_series(&returns);
    let m_tensor = tensor_series(&market);

    let pairs = [
        (
            sharpe_ratio(&r_array, rf).read_scalar(),
            sharpe_ratio(&r_tensor, rf).read_scalar(),
        ),
        (
            sortino_ratio(&r_array, rf).read_scalar(),
            sortino_ratio(&r_tensor, rf).read_scalar(),
        ),
        (
            max_drawdown(&r_array).read_scalar(),
            max_drawdown(&r_tensor).read_scalar(),
        ),
        (
            beta(&r_array, &m_array).read_scalar(),
            beta(&r_tensor, &m_tensor).read_scalar(),
        ),
        (
            alpha(&r_array, &m_array, rf).read_scalar(),
            alpha(&r_tensor, &m_tensor, rf).read_scalar(),
        ),
    ];

    for (array_value, tensor_value) in pairs {
        assert!(
            (array_value - tensor_value).abs() < 1e-4,
            "backend disagreement: array {} vs tensor {}",
            array_value,
            tensor_value
        );
    }
}

#[test]
fn empty_series_yield_the_sentinel_not_a_panic() {
    let empty = array_series(&[]);
    assert!(sharpe_ratio(&empty, 0.0).read_scalar().is_nan());
    assert!(sortino_ratio(&empty, 0.0).read_scalar().is_nan());
    assert!(max_drawdown(&empty).read_scalar().is_nan());
    assert!(beta(&empty, &empty).read_scalar().is_nan());
    assert!(alpha(&empty, &empty, 0.0).read_scalar().is_nan());
}
