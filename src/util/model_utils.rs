use anyhow::{Context, Result};
use burn::tensor::backend::Backend;
use std::path::PathBuf;

use crate::constants::MODEL_PATH;
use crate::dmn::step_1_sequence_preparation::MinMaxScaler;
use crate::dmn::step_3_dmn_model_arch::DeepMomentumModel;
use crate::dmn::step_6_model_serialization::{
    load_model_with_metadata, save_model_with_metadata, ModelMetadata,
};

/// Get the default path for saving models
pub fn get_model_path(symbol: &str, model_type: &str) -> PathBuf {
    let folder_path = format!("{}/{}/{}", MODEL_PATH, symbol, model_type);
    PathBuf::from(folder_path)
}

/// Save a trained model with its metadata and scaler under MODEL_PATH
pub fn save_trained_model<B: Backend>(
    model: &DeepMomentumModel<B>,
    metadata: &ModelMetadata,
    scaler: &MinMaxScaler,
    symbol: &str,
    model_type: &str,
    model_name: &str,
) -> Result<PathBuf> {
    let model_dir = get_model_path(symbol, model_type);
    std::fs::create_dir_all(&model_dir).context("Failed to create models directory")?;

    let model_path = model_dir.join(model_name);
    save_model_with_metadata(model, metadata, scaler, &model_path)
        .context("Failed to save model")?;

    Ok(model_path)
}

/// Save a model checkpoint during training
pub fn save_model_checkpoint<B: Backend>(
    model: &DeepMomentumModel<B>,
    metadata: &ModelMetadata,
    scaler: &MinMaxScaler,
    symbol: &str,
    model_type: &str,
    model_name: &str,
    epoch: usize,
) -> Result<PathBuf> {
    let checkpoint_name = format!("{}_epoch_{}", model_name, epoch);
    save_trained_model(model, metadata, scaler, symbol, model_type, &checkpoint_name)
}

/// Load a trained model with its metadata and scaler from MODEL_PATH
pub fn load_trained_model<B: Backend>(
    symbol: &str,
    model_type: &str,
    model_name: &str,
    device: &B::Device,
) -> Result<(DeepMomentumModel<B>, ModelMetadata, MinMaxScaler)> {
    let model_path = get_model_path(symbol, model_type).join(model_name);
    load_model_with_metadata(&model_path, device).context("Failed to load model")
}
