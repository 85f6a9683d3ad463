// External crates
use burn::tensor::{backend::Backend, Shape, Tensor};
use ndarray::{s, Array1, Array2, Array3, ArrayView2};
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

// Internal modules
use crate::constants::TARGET_COLUMN;
use crate::error::PipelineError;

/// Per-column min/max scaler, fitted once on the training matrix.
///
/// The fitted parameters are the only normalization state in the pipeline:
/// evaluation and inference data must be transformed with the scaler fitted
/// on training data, never refitted, or future statistics leak into the
/// evaluation set. The struct is serde-serializable so the snapshot can be
/// persisted next to the model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    columns: Vec<String>,
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Captures per-column min/max statistics from `df`.
    pub fn fit(df: &DataFrame, columns: &[&str]) -> Result<Self, PipelineError> {
        if df.height() == 0 {
            return Err(PipelineError::InsufficientData(
                "cannot fit scaler on an empty DataFrame".to_string(),
            ));
        }

        let mut mins = Vec::with_capacity(columns.len());
        let mut maxs = Vec::with_capacity(columns.len());
        for &col in columns {
            let series = df
                .column(col)
                .and_then(|c| c.f64())
                .map_err(|e| PipelineError::InvalidParameter(format!("column {}: {}", col, e)))?;
            mins.push(series.min().unwrap_or(f64::NAN));
            maxs.push(series.max().unwrap_or(f64::NAN));
        }

        Ok(Self {
            columns: columns.iter().map(|s| s.to_string()).collect(),
            mins,
            maxs,
        })
    }

    /// Applies the fitted scaling to `df`, returning the normalized matrix
    /// with columns in fitted order. Values outside the fitted range map
    /// outside [0, 1]; constant columns map to 0.0.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>, PipelineError> {
        let n_rows = df.height();
        let n_cols = self.columns.len();
        let mut matrix = Array2::zeros((n_rows, n_cols));

        for (col_idx, col) in self.columns.iter().enumerate() {
            let series = df
                .column(col)
                .and_then(|c| c.f64())
                .map_err(|e| PipelineError::InvalidParameter(format!("column {}: {}", col, e)))?;
            let min = self.mins[col_idx];
            let span = self.maxs[col_idx] - min;

            for (row_idx, value) in series.into_iter().enumerate() {
                let v = value.unwrap_or(f64::NAN);
                matrix[[row_idx, col_idx]] = if span == 0.0 { 0.0 } else { (v - min) / span };
            }
        }

        Ok(matrix)
    }

    pub fn fit_transform(
        df: &DataFrame,
        columns: &[&str],
    ) -> Result<(Self, Array2<f64>), PipelineError> {
        let scaler = Self::fit(df, columns)?;
        let matrix = scaler.transform(df)?;
        Ok((scaler, matrix))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Resolves a column index by name, so target selection never depends
    /// on column position.
    pub fn column_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| {
                PipelineError::InvalidParameter(format!("column {} is not part of the scaler", name))
            })
    }
}

/// Slices a normalized matrix into overlapping windows with next-step
/// targets.
///
/// Produces exactly `nrows - sequence_length` windows; window `i` covers
/// rows `[i, i + L)` and `target[i]` is the designated column at row
/// `i + L`.
pub fn create_sequences(
    data: ArrayView2<f64>,
    sequence_length: usize,
    target_column: usize,
) -> Result<(Array3<f64>, Array1<f64>), PipelineError> {
    let n_rows = data.nrows();
    let n_cols = data.ncols();

    if sequence_length == 0 {
        return Err(PipelineError::InvalidParameter(
            "sequence length must be at least 1".to_string(),
        ));
    }
    if target_column >= n_cols {
        return Err(PipelineError::InvalidParameter(format!(
            "target column {} out of range ({} columns)",
            target_column, n_cols
        )));
    }
    if n_rows <= sequence_length {
        return Err(PipelineError::InsufficientData(format!(
            "{} rows cannot produce a single window of length {}",
            n_rows, sequence_length
        )));
    }

    let n_windows = n_rows - sequence_length;
    let mut windows = Array3::zeros((n_windows, sequence_length, n_cols));
    let mut targets = Array1::zeros(n_windows);

    for i in 0..n_windows {
        windows
            .slice_mut(s![i, .., ..])
            .assign(&data.slice(s![i..i + sequence_length, ..]));
        targets[i] = data[[i + sequence_length, target_column]];
    }

    Ok((windows, targets))
}

/// Normalizes the feature DataFrame with a fitted scaler and converts the
/// windows and targets to Burn tensors.
pub fn dataframe_to_tensors<B: Backend>(
    df: &DataFrame,
    scaler: &MinMaxScaler,
    sequence_length: usize,
    device: &B::Device,
) -> Result<(Tensor<B, 3>, Tensor<B, 1>), PipelineError> {
    let matrix = scaler.transform(df)?;
    let target_idx = scaler.column_index(TARGET_COLUMN)?;
    let (windows, targets) = create_sequences(matrix.view(), sequence_length, target_idx)?;

    let n_windows = windows.dim().0;
    let n_cols = windows.dim().2;

    // Flatten windows row-major into one f32 buffer; windows are
    // independent, so the flattening parallelizes cleanly
    let flattened: Vec<Vec<f32>> = (0..n_windows)
        .into_par_iter()
        .map(|i| {
            windows
                .slice(s![i, .., ..])
                .iter()
                .map(|&v| v as f32)
                .collect()
        })
        .collect();

    let mut feature_buffer = Vec::with_capacity(n_windows * sequence_length * n_cols);
    for window in flattened {
        feature_buffer.extend(window);
    }
    let target_buffer: Vec<f32> = targets.iter().map(|&v| v as f32).collect();

    let features = Tensor::<B, 1>::from_floats(feature_buffer.as_slice(), device)
        .reshape(Shape::new([n_windows, sequence_length, n_cols]));
    let targets = Tensor::<B, 1>::from_floats(target_buffer.as_slice(), device);

    Ok((features, targets))
}

/// Next-bar market return for each window.
///
/// The window over rows `[i, i + L)` trades the return realized from
/// `close[i + L - 1]` to `close[i + L]`, so every input the model sees
/// precedes the traded interval. A zero close propagates NaN/Inf as a
/// data-quality signal.
pub fn forward_return_series(
    close: &[f64],
    sequence_length: usize,
) -> Result<Vec<f64>, PipelineError> {
    if close.len() <= sequence_length {
        return Err(PipelineError::InsufficientData(format!(
            "{} closes cannot produce a single window of length {}",
            close.len(),
            sequence_length
        )));
    }

    let mut returns = Vec::with_capacity(close.len() - sequence_length);
    for i in 0..close.len() - sequence_length {
        let entry = close[i + sequence_length - 1];
        let exit = close[i + sequence_length];
        returns.push((exit - entry) / entry);
    }
    Ok(returns)
}

/// Raw close prices in row order.
pub fn close_prices(df: &DataFrame) -> Result<Vec<f64>, PipelineError> {
    let series = df
        .column(TARGET_COLUMN)
        .and_then(|c| c.f64())
        .map_err(|e| PipelineError::InvalidParameter(format!("column close: {}", e)))?;
    Ok(series
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Splits the DataFrame into training and validation sets, keeping the
/// chronological tail for validation.
pub fn split_data(
    df: &DataFrame,
    validation_split: f64,
) -> Result<(DataFrame, DataFrame), PipelineError> {
    if df.height() == 0 {
        return Err(PipelineError::InsufficientData(
            "empty DataFrame".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&validation_split) {
        return Err(PipelineError::InvalidParameter(
            "validation split must be between 0.0 and 1.0".to_string(),
        ));
    }

    let n_samples = df.height();
    let split_idx = (n_samples as f64 * (1.0 - validation_split)) as usize;
    let train_df = df.slice(0, split_idx);
    let val_df = df.slice(split_idx as i64, n_samples - split_idx);
    Ok((train_df, val_df))
}
