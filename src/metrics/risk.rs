//! Risk-adjusted performance statistics over a return series.
//!
//! Every function is generic over [`NumericSeries`], so the same formulas
//! serve as the differentiable training objective (tensor backend) and as
//! evaluation reporting (array backend). A zero denominator never raises:
//! it short-circuits to the backend's NaN sentinel via a detached scalar
//! check, keeping the gradient path free of tensor-valued branches.

use super::numeric_series::NumericSeries;

/// Sharpe ratio: mean excess return over its standard deviation.
///
/// Returns the NaN sentinel when the excess-return deviation is zero
/// (for example a constant return series).
pub fn sharpe_ratio<S: NumericSeries>(returns: &S, risk_free_rate: f64) -> S {
    if returns.is_empty() {
        return returns.undefined();
    }
    let excess = returns.sub_scalar(risk_free_rate);
    let deviation = excess.std();
    if deviation.read_scalar() == 0.0 {
        return returns.undefined();
    }
    excess.mean().div(&deviation)
}

/// Sortino ratio: mean excess return over the deviation of the downside.
///
/// The denominator is the population std of `min(r - rf, 0)`, so only
/// below-baseline observations contribute spread. NaN sentinel when no
/// observation falls below the baseline.
pub fn sortino_ratio<S: NumericSeries>(returns: &S, risk_free_rate: f64) -> S {
    if returns.is_empty() {
        return returns.undefined();
    }
    let excess = returns.sub_scalar(risk_free_rate);
    let downside_deviation = excess.downside().std();
    if downside_deviation.read_scalar() == 0.0 {
        return returns.undefined();
    }
    excess.mean().div(&downside_deviation)
}

/// Maximum drawdown of the compounded wealth path.
///
/// Wealth is the cumulative product of `1 + r`; drawdown at each step is
/// the relative decline from the running peak. A wealth path that touches
/// zero (a -100% return) makes the ratio undefined and yields the sentinel.
pub fn max_drawdown<S: NumericSeries>(returns: &S) -> S {
    if returns.is_empty() {
        return returns.undefined();
    }
    let wealth = returns.add_scalar(1.0).cumulative_product();
    let peak = wealth.running_max();
    if peak.min().read_scalar() <= 0.0 {
        return returns.undefined();
    }
    peak.sub(&wealth).div(&peak).max()
}

/// Beta of a return series against market returns.
///
/// Mismatched lengths are truncated to the common prefix before computing;
/// that alignment is a deliberate policy shared with [`alpha`]. NaN
/// sentinel when the market variance is zero.
pub fn beta<S: NumericSeries>(returns: &S, market_returns: &S) -> S {
    let common = returns.len().min(market_returns.len());
    if common == 0 {
        return returns.undefined();
    }
    let aligned = returns.truncated(common);
    let market = market_returns.truncated(common);
    let market_variance = market.var();
    if market_variance.read_scalar() == 0.0 {
        return returns.undefined();
    }
    aligned.covariance(&market).div(&market_variance)
}

/// Jensen's alpha against a market series.
///
/// Truncates once to the common prefix and computes beta on that same
/// aligned pair, so the CAPM benchmark and the excess mean cannot drift
/// onto different alignments. An undefined beta propagates the sentinel.
pub fn alpha<S: NumericSeries>(returns: &S, market_returns: &S, risk_free_rate: f64) -> S {
    let common = returns.len().min(market_returns.len());
    if common == 0 {
        return returns.undefined();
    }
    let aligned = returns.truncated(common);
    let market = market_returns.truncated(common);
    let beta_value = beta(&aligned, &market);

    let benchmark = market
        .sub_scalar(risk_free_rate)
        .mul(&beta_value)
        .add_scalar(risk_free_rate);
    aligned.sub(&benchmark).mean()
}
