// External crates
use anyhow::Result;
use burn::module::AutodiffModule;
use std::env;
use std::path::Path;
use std::time::Instant;

// Local modules
use deep_momentum::constants::{FEATURE_COLUMNS, SEQUENCE_LENGTH};
use deep_momentum::dmn::step_1_sequence_preparation::{
    close_prices, dataframe_to_tensors, forward_return_series, split_data,
};
use deep_momentum::dmn::step_3_dmn_model_arch::DeepMomentumModelConfig;
use deep_momentum::dmn::step_4_train_model::{train_model, TrainingBackend, TrainingConfig};
use deep_momentum::dmn::step_5_position_stream::{generate_positions, performance_report};
use deep_momentum::util::feature_engineering::{add_feature_columns, FeatureParams};
use deep_momentum::util::model_logger::{create_experiment_dir, TrainingExperiment};
use deep_momentum::util::pre_processor;

fn main() -> Result<()> {
    // Accept symbol, CSV path, and epoch count as command-line arguments
    let args: Vec<String> = env::args().collect();
    let symbol = args.get(1).map(|s| s.as_str()).unwrap_or("AAPL");
    let default_path = format!("{}-bars.csv", symbol);
    let csv_path = args.get(2).map(|s| s.as_str()).unwrap_or(&default_path);
    let epochs = args
        .get(3)
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(10);
    println!("Using symbol: {} | data: {}", symbol, csv_path);

    // Load bars and derive the indicator feature matrix
    let mut bars = pre_processor::load_and_preprocess(Path::new(csv_path))?;
    let features = add_feature_columns(&mut bars, &FeatureParams::default())?;
    println!("Feature matrix: {} rows", features.height());

    let model_config = DeepMomentumModelConfig {
        input_size: FEATURE_COLUMNS.len(),
        hidden_size: 64,
        output_size: 1,
        num_layers: 1,
        dropout_rate: 0.2,
    };
    let training_config = TrainingConfig {
        epochs,
        ..Default::default()
    };

    // Seed the backend so parameter initialization is reproducible
    <TrainingBackend as burn::tensor::backend::Backend>::seed(42);

    let device = <TrainingBackend as burn::tensor::backend::Backend>::Device::default();
    let start = Instant::now();
    let outcome = train_model(
        features.clone(),
        model_config.clone(),
        training_config.clone(),
        &device,
        symbol,
    )?;
    let elapsed = start.elapsed().as_secs_f64();
    println!("Training finished in {:.1}s", elapsed);

    // Evaluate the position stream on the held-out chronological tail,
    // reusing the scaler fitted during training
    let (_, val_df) = split_data(&features, training_config.validation_split)?;
    let (val_x, _) = dataframe_to_tensors::<TrainingBackend>(
        &val_df,
        &outcome.scaler,
        SEQUENCE_LENGTH,
        &device,
    )?;
    let val_returns = forward_return_series(&close_prices(&val_df)?, SEQUENCE_LENGTH)?;
    let positions = generate_positions(&outcome.model.valid(), val_x.inner());
    let report = performance_report(&positions, &val_returns, training_config.risk_free_rate);
    println!(
        "Validation performance:\n{}",
        serde_json::to_string_pretty(&report)?
    );

    // Record the experiment
    let mut experiment = TrainingExperiment::new(
        symbol,
        "dmn",
        model_config.hidden_size,
        model_config.num_layers,
        model_config.dropout_rate,
        SEQUENCE_LENGTH,
        training_config.batch_size,
        training_config.learning_rate,
    );
    if let Some(&last_objective) = outcome.epoch_objectives.last() {
        experiment.set_train_sharpe(-last_objective);
    }
    experiment.set_validation_sharpe(report.sharpe);
    experiment.set_training_time(elapsed);
    let experiment_dir = create_experiment_dir()?;
    let record_path = experiment.save(&experiment_dir)?;
    println!("Experiment record saved to {}", record_path.display());

    Ok(())
}
