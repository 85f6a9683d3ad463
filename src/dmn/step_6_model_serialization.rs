use anyhow::{Context, Result};
use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::SystemTime;

use super::step_1_sequence_preparation::MinMaxScaler;
use super::step_3_dmn_model_arch::{DeepMomentumModel, DeepMomentumModelConfig};

#[derive(Serialize, Deserialize, Clone)]
pub struct ModelMetadata {
    pub version: String,
    pub timestamp: u64,
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
    pub sequence_length: usize,
}

impl ModelMetadata {
    pub fn new(config: &DeepMomentumModelConfig, sequence_length: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            input_size: config.input_size,
            hidden_size: config.hidden_size,
            output_size: config.output_size,
            num_layers: config.num_layers,
            dropout: config.dropout_rate,
            sequence_length,
        }
    }

    pub fn model_config(&self) -> DeepMomentumModelConfig {
        DeepMomentumModelConfig {
            input_size: self.input_size,
            hidden_size: self.hidden_size,
            output_size: self.output_size,
            num_layers: self.num_layers,
            dropout_rate: self.dropout,
        }
    }
}

/// Save the model together with its metadata and fitted scaler
///
/// Writes three sidecar files: `.bin` (parameter record), `.meta.json`
/// (architecture + provenance), and `.scaler.json` (the normalization
/// snapshot that inference must reuse).
pub fn save_model_with_metadata<B: Backend>(
    model: &DeepMomentumModel<B>,
    metadata: &ModelMetadata,
    scaler: &MinMaxScaler,
    path: impl AsRef<Path>,
) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent).context("Failed to create model parent directory")?;
    }

    let model_path = path.as_ref().with_extension("bin");
    model
        .clone()
        .save_file::<BinFileRecorder<FullPrecisionSettings>, _>(&model_path, &Default::default())
        .context("Failed to save model")?;

    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        serde_json::to_string_pretty(metadata).context("Failed to serialize metadata")?;
    std::fs::write(&metadata_path, metadata_json).context("Failed to write metadata file")?;

    let scaler_path = path.as_ref().with_extension("scaler.json");
    let scaler_json = serde_json::to_string_pretty(scaler).context("Failed to serialize scaler")?;
    std::fs::write(&scaler_path, scaler_json).context("Failed to write scaler file")?;

    info!("Model snapshot written to {}", model_path.display());
    Ok(())
}

/// Load the model, its metadata, and the fitted scaler from a base path
pub fn load_model_with_metadata<B: Backend>(
    path: impl AsRef<Path>,
    device: &B::Device,
) -> Result<(DeepMomentumModel<B>, ModelMetadata, MinMaxScaler)> {
    let metadata_path = path.as_ref().with_extension("meta.json");
    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let metadata: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;

    let scaler_path = path.as_ref().with_extension("scaler.json");
    let scaler_json =
        std::fs::read_to_string(&scaler_path).context("Failed to read scaler file")?;
    let scaler: MinMaxScaler =
        serde_json::from_str(&scaler_json).context("Failed to parse scaler")?;

    // The metadata pins the architecture, so the record always fits
    let model_path = path.as_ref().with_extension("bin");
    let model = metadata
        .model_config()
        .init(device)
        .load_file::<BinFileRecorder<FullPrecisionSettings>, _>(
            &model_path,
            &Default::default(),
            device,
        )
        .context("Failed to load model")?;

    Ok((model, metadata, scaler))
}

/// Check that a snapshot's sidecar files exist and parse
pub fn verify_model(path: impl AsRef<Path>) -> Result<bool> {
    let model_path = path.as_ref().with_extension("bin");
    let metadata_path = path.as_ref().with_extension("meta.json");
    let scaler_path = path.as_ref().with_extension("scaler.json");

    if !model_path.exists() || !metadata_path.exists() || !scaler_path.exists() {
        return Ok(false);
    }

    let metadata_json =
        std::fs::read_to_string(&metadata_path).context("Failed to read metadata file")?;
    let _: ModelMetadata =
        serde_json::from_str(&metadata_json).context("Failed to parse metadata")?;
    let scaler_json =
        std::fs::read_to_string(&scaler_path).context("Failed to read scaler file")?;
    let _: MinMaxScaler = serde_json::from_str(&scaler_json).context("Failed to parse scaler")?;

    Ok(true)
}
