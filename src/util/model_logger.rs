use anyhow::Result;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One training run's configuration and outcome, written as a JSON record
#[derive(Serialize, Deserialize)]
pub struct TrainingExperiment {
    pub timestamp: String,
    pub symbol: String,
    pub model_type: String,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub dropout: f64,
    pub sequence_length: usize,
    pub batch_size: usize,
    pub learning_rate: f64,
    pub train_sharpe: Option<f64>,
    pub validation_sharpe: Option<f64>,
    pub training_time_seconds: Option<f64>,
    pub notes: String,
}

impl TrainingExperiment {
    pub fn new(
        symbol: &str,
        model_type: &str,
        hidden_size: usize,
        num_layers: usize,
        dropout: f64,
        sequence_length: usize,
        batch_size: usize,
        learning_rate: f64,
    ) -> Self {
        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            symbol: symbol.to_string(),
            model_type: model_type.to_string(),
            hidden_size,
            num_layers,
            dropout,
            sequence_length,
            batch_size,
            learning_rate,
            train_sharpe: None,
            validation_sharpe: None,
            training_time_seconds: None,
            notes: String::new(),
        }
    }

    pub fn set_train_sharpe(&mut self, sharpe: f64) {
        self.train_sharpe = Some(sharpe);
    }

    pub fn set_validation_sharpe(&mut self, sharpe: f64) {
        self.validation_sharpe = Some(sharpe);
    }

    pub fn set_training_time(&mut self, seconds: f64) {
        self.training_time_seconds = Some(seconds);
    }

    pub fn add_note(&mut self, note: &str) {
        if !self.notes.is_empty() {
            self.notes.push('\n');
        }
        self.notes.push_str(note);
    }

    pub fn save(&self, experiment_dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(experiment_dir)?;

        let filename = format!(
            "{}_{}_h{}_l{}_d{}_experiment.json",
            self.symbol,
            self.model_type,
            self.hidden_size,
            self.num_layers,
            (self.dropout * 100.0) as i32,
        );
        let file_path = experiment_dir.join(filename);

        let json = serde_json::to_string_pretty(&self)?;
        let mut file = fs::File::create(&file_path)?;
        file.write_all(json.as_bytes())?;

        Ok(file_path)
    }
}

pub fn create_experiment_dir() -> Result<PathBuf> {
    let dir = Path::new("experiments").join(Local::now().format("%Y%m%d_%H%M%S").to_string());
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
