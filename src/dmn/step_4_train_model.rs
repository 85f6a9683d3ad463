// External imports
use anyhow::Result;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::tensor::Tensor;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use log::{info, warn};
use ndarray::Array1;
use polars::prelude::DataFrame;

// Internal imports
use super::step_1_sequence_preparation::{
    close_prices, dataframe_to_tensors, forward_return_series, split_data, MinMaxScaler,
};
use super::step_3_dmn_model_arch::{DeepMomentumModel, DeepMomentumModelConfig};
use super::step_5_position_stream::{generate_positions, strategy_returns};
use crate::constants::{self, DEFAULT_RISK_FREE_RATE, FEATURE_COLUMNS, SEQUENCE_LENGTH};
use crate::metrics::numeric_series::NumericSeries;
use crate::metrics::risk;
use crate::util::model_utils;

pub type TrainingBackend = Autodiff<NdArray<f32>>;

/// Configuration for training the model
#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub batch_size: usize,
    pub epochs: usize,
    pub validation_split: f64,
    pub patience: usize,
    pub min_delta: f64,
    pub risk_free_rate: f64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.001,
            batch_size: 32,
            epochs: 10,
            validation_split: constants::VALIDATION_SPLIT_RATIO,
            patience: 3,      // Early stopping patience
            min_delta: 0.001, // Minimum improvement threshold
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

/// Everything a caller needs after training: the policy, the normalization
/// snapshot it was trained with, and the per-epoch objective history.
pub struct TrainingOutcome {
    pub model: DeepMomentumModel<TrainingBackend>,
    pub scaler: MinMaxScaler,
    pub epoch_objectives: Vec<f64>,
    pub validation_sharpe: Vec<f64>,
}

/// Train the deep momentum model by maximizing the Sharpe ratio of the
/// realized strategy returns.
///
/// Each batch runs the policy over a chronological slice of windows,
/// multiplies the positions with the next-bar market returns, and descends
/// the negative Sharpe ratio of that strategy-return series. Batches whose
/// Sharpe is undefined (zero return variance) skip the optimizer step so no
/// NaN gradients ever reach the parameters.
pub fn train_model(
    df: DataFrame,
    model_config: DeepMomentumModelConfig,
    config: TrainingConfig,
    device: &<TrainingBackend as burn::tensor::backend::Backend>::Device,
    symbol: &str,
) -> Result<TrainingOutcome> {
    info!("Starting model training for {}", symbol);

    let (train_df, val_df) = split_data(&df, config.validation_split)?;

    // The scaler is fitted on the training rows only and reused verbatim
    // for validation; refitting would leak future min/max statistics
    let scaler = MinMaxScaler::fit(&train_df, &FEATURE_COLUMNS)?;

    let (train_x, _train_targets) =
        dataframe_to_tensors::<TrainingBackend>(&train_df, &scaler, SEQUENCE_LENGTH, device)?;
    let train_returns_raw = forward_return_series(&close_prices(&train_df)?, SEQUENCE_LENGTH)?;
    let train_returns_f32: Vec<f32> = train_returns_raw.iter().map(|&v| v as f32).collect();
    let train_returns =
        Tensor::<TrainingBackend, 1>::from_floats(train_returns_f32.as_slice(), device);

    let (val_x, _val_targets) =
        dataframe_to_tensors::<TrainingBackend>(&val_df, &scaler, SEQUENCE_LENGTH, device)?;
    let val_returns = forward_return_series(&close_prices(&val_df)?, SEQUENCE_LENGTH)?;

    let num_windows = train_x.dims()[0];
    info!(
        "Data prepared: {} training windows, {} validation windows",
        num_windows,
        val_x.dims()[0]
    );

    let mut model = model_config.init::<TrainingBackend>(device);
    let metadata =
        super::step_6_model_serialization::ModelMetadata::new(&model_config, SEQUENCE_LENGTH);
    let mut optimizer = AdamConfig::new().init();

    // Early stopping state
    let mut best_model = model.clone();
    let mut best_val_sharpe = f64::NEG_INFINITY;
    let mut epochs_no_improve = 0;

    let mut epoch_objectives = Vec::with_capacity(config.epochs);
    let mut validation_sharpe = Vec::with_capacity(config.epochs);
    let model_name = format!("{}{}", symbol, constants::MODEL_FILE_NAME);

    for epoch in 1..=config.epochs {
        // Linear learning rate decay, floored to keep the step finite
        let mut current_lr =
            config.learning_rate * (1.0 - (epoch as f64 - 1.0) / (config.epochs as f64));
        if current_lr < 1e-8 {
            current_lr = 1e-8;
        }

        let mut epoch_objective = 0.0;
        let mut stepped_batches = 0;
        let mut start = 0;

        while start < num_windows {
            let size = usize::min(config.batch_size, num_windows - start);
            let batch_x = train_x.clone().narrow(0, start, size);
            let batch_returns = train_returns.clone().narrow(0, start, size);
            start += size;

            // Forward pass: bounded positions, then realized strategy returns
            let positions = model.forward_positions(batch_x);
            let batch_strategy = positions * batch_returns;

            let sharpe = risk::sharpe_ratio(&batch_strategy, config.risk_free_rate);

            // Detached scalar check, outside the gradient path: an
            // undefined Sharpe must not reach the optimizer
            let sharpe_value = sharpe.read_scalar();
            if !sharpe_value.is_finite() {
                warn!(
                    "epoch {}: skipping optimizer step for batch ending at {} (undefined Sharpe)",
                    epoch, start
                );
                continue;
            }

            let loss = sharpe.neg();
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(current_lr, model, grads);

            epoch_objective += -sharpe_value;
            stepped_batches += 1;
        }

        let avg_objective = if stepped_batches > 0 {
            epoch_objective / stepped_batches as f64
        } else {
            f64::NAN
        };
        epoch_objectives.push(avg_objective);

        // Validation on the chronological tail, reported on the array backend
        let val_sharpe = evaluate_sharpe(&model, val_x.clone(), &val_returns, config.risk_free_rate);
        validation_sharpe.push(val_sharpe);
        info!(
            "Epoch {}/{}: objective = {:.6}, validation Sharpe = {:.6}",
            epoch, config.epochs, avg_objective, val_sharpe
        );

        // Early stopping on validation Sharpe; an undefined value never
        // counts as an improvement
        if val_sharpe - best_val_sharpe > config.min_delta {
            best_val_sharpe = val_sharpe;
            best_model = model.clone();
            epochs_no_improve = 0;
        } else {
            epochs_no_improve += 1;
            if epochs_no_improve >= config.patience {
                info!(
                    "Early stopping triggered at epoch {} (best validation Sharpe = {:.6})",
                    epoch, best_val_sharpe
                );
                model = best_model.clone();
                break;
            }
        }

        // Save checkpoint every 5 epochs
        if epoch % 5 == 0 {
            let _ = model_utils::save_model_checkpoint(
                &model,
                &metadata,
                &scaler,
                symbol,
                "dmn",
                &model_name,
                epoch,
            );
        }
    }

    // Save the final model after training
    model_utils::save_trained_model(&model, &metadata, &scaler, symbol, "dmn", &model_name)?;

    info!("Training completed and model saved.");
    Ok(TrainingOutcome {
        model,
        scaler,
        epoch_objectives,
        validation_sharpe,
    })
}

/// Sharpe ratio of the strategy implied by the model on a window batch.
///
/// Runs on the inner backend (dropout inactive) and reports on the array
/// backend; no gradients are involved.
pub fn evaluate_sharpe(
    model: &DeepMomentumModel<TrainingBackend>,
    features: Tensor<TrainingBackend, 3>,
    market_returns: &[f64],
    risk_free_rate: f64,
) -> f64 {
    if features.dims()[0] == 0 || market_returns.is_empty() {
        return f64::NAN;
    }
    let positions = generate_positions(&model.valid(), features.inner());
    let strategy: Array1<f64> = strategy_returns(&positions, market_returns);
    risk::sharpe_ratio(&strategy, risk_free_rate).read_scalar()
}
