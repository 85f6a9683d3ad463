// External crates
use polars::error::PolarsError;
use polars::prelude::*;
use std::path::Path;

// Local modules
use crate::util::file_utils::read_financial_csv;

/// Loads a bar CSV into a validated, chronological DataFrame
///
/// Market-data exports frequently arrive reverse-chronological; everything
/// downstream (indicators, windowing, forward returns) assumes strictly
/// increasing time, so the sort here is mandatory, not cosmetic.
pub fn load_and_preprocess(full_path: &Path) -> PolarsResult<DataFrame> {
    if !full_path.exists() {
        return Err(PolarsError::ComputeError(
            format!("File not found: {}", full_path.display()).into(),
        ));
    }

    let mut df = read_financial_csv(full_path)?;

    // Verify required columns exist
    let required_columns = ["open", "high", "low", "close", "volume"];
    for &col in &required_columns {
        if df.column(col).is_err() {
            return Err(PolarsError::ColumnNotFound(
                format!("Required column {} not found", col).into(),
            ));
        }
    }

    // Restore chronological order before any feature derivation
    if df.column("time").is_ok() {
        df = df.sort(vec!["time"], SortMultipleOptions::default())?;
    }

    // Drop any rows with missing values
    df = df.drop_nulls::<String>(None)?;

    Ok(df)
}
