/// Test modules for the deep momentum trading pipeline
///
/// The suites are organized by the component they exercise:
///
/// * `metrics` - Risk-statistic properties, verified on both the array and
///   the tensor backend so the two can never drift apart
/// * `dmn` - Sequence preparation contracts and the bounded-output policy
///   model
/// * `main_tests` - End-to-end pipeline runs on synthetic bar data,
///   including the undefined-objective skip policy
pub mod dmn;
pub mod metrics;
