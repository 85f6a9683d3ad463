// External imports
use anyhow::Result;
use chrono::{Duration, NaiveDateTime};
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// Internal modules
use crate::util::feature_engineering::{add_feature_columns, FeatureParams};

/// Generate a deterministic synthetic bar DataFrame for testing
///
/// The seed pins the random walk so tests are reproducible run to run.
pub fn generate_bar_dataframe(num_rows: usize, seed: u64) -> Result<DataFrame> {
    let mut rng = StdRng::seed_from_u64(seed);

    // Create time series dates
    let base_date =
        NaiveDateTime::parse_from_str("2023-01-01 09:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
    let times: Vec<String> = (0..num_rows)
        .map(|i| {
            (base_date + Duration::minutes(i as i64))
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .collect();

    let mut close_prices = Vec::with_capacity(num_rows);
    let mut open_prices = Vec::with_capacity(num_rows);
    let mut high_prices = Vec::with_capacity(num_rows);
    let mut low_prices = Vec::with_capacity(num_rows);
    let mut volume = Vec::with_capacity(num_rows);

    // Start with a base price around $100
    let mut current_price: f64 = 100.0 + rng.random::<f64>() * 50.0;

    for _ in 0..num_rows {
        // Random price movement between -1% and +1%
        let movement = (rng.random::<f64>() * 2.0 - 1.0) * 0.01;
        current_price *= 1.0 + movement;

        // Generate open, high, low with realistic relationships to close
        let open = current_price * (1.0 + (rng.random::<f64>() * 0.01 - 0.005));
        let high = current_price.max(open) * (1.0 + rng.random::<f64>() * 0.005);
        let low = current_price.min(open) * (1.0 - rng.random::<f64>() * 0.005);

        let vol = rng.random_range(10_000.0..110_000.0);

        close_prices.push(current_price);
        open_prices.push(open);
        high_prices.push(high);
        low_prices.push(low);
        volume.push(vol);
    }

    let df = DataFrame::new(vec![
        Series::new("time".into(), times).into(),
        Series::new("open".into(), open_prices).into(),
        Series::new("high".into(), high_prices).into(),
        Series::new("low".into(), low_prices).into(),
        Series::new("close".into(), close_prices).into(),
        Series::new("volume".into(), volume).into(),
    ])?;

    Ok(df)
}

/// Synthetic bars with the full indicator feature set attached
pub fn generate_feature_dataframe(num_rows: usize, seed: u64) -> Result<DataFrame> {
    let mut df = generate_bar_dataframe(num_rows, seed)?;
    let features = add_feature_columns(&mut df, &FeatureParams::default())?;
    Ok(features)
}
