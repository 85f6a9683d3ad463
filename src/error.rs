use thiserror::Error;

/// Fail-fast errors raised before any model call.
///
/// Only parameter and shape problems are errors. Statistical undefined-ness
/// (a zero variance, std, or downside std) is NOT represented here: the
/// metrics in [`crate::metrics::risk`] return a NaN sentinel for those cases
/// so the value can flow through a differentiable path, and callers check it
/// before consuming (the training loop skips the optimizer step, reporting
/// prints the sentinel). Division by a zero historical price in return
/// computations likewise propagates NaN/Inf as a data-quality signal rather
/// than an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A window or lookback parameter exceeds the available data length
    /// (or is zero). Raised at feature-computation time, never silently
    /// truncated.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough rows to build even one training window.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
}
