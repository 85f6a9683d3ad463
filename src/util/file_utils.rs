// External crates
use polars::prelude::*;
use rustalib::util::file_utils::read_financial_data;
use std::path::Path;

/// Reads a financial CSV with case-insensitive column standardization
///
/// Wraps rustalib's reader and maps vendor column spellings onto the
/// lowercase names the rest of the pipeline expects.
pub fn read_financial_csv<P: AsRef<Path>>(file_path: P) -> PolarsResult<DataFrame> {
    let path_str = file_path.as_ref().to_str().ok_or_else(|| {
        PolarsError::ComputeError(
            format!("non-UTF-8 path: {}", file_path.as_ref().display()).into(),
        )
    })?;
    let (mut df, _metadata) = read_financial_data(path_str)?;

    // Identify columns to rename based on lowercase matching
    let mut rename_columns = Vec::new();
    for column_name in df.get_column_names() {
        let col_lower = column_name.to_lowercase();

        let standard_name = match col_lower.as_str() {
            "open" | "o" | "op" | "openprice" | "open_price" => "open",
            "high" | "h" | "highprice" | "high_price" => "high",
            "low" | "l" | "lowprice" | "low_price" => "low",
            "close" | "c" | "cl" | "closeprice" | "close_price" => "close",
            "volume" | "vol" | "v" | "volumes" => "volume",
            "timestamp" | "time" | "date" | "t" | "datetime" | "dt" | "day" => "time",
            _ => continue,
        };

        if column_name != standard_name {
            rename_columns.push((column_name.to_string(), standard_name.to_string()));
        }
    }

    if !rename_columns.is_empty() {
        let mut lazy_df = df.clone().lazy();
        for (old_name, new_name) in rename_columns {
            lazy_df = lazy_df.with_column(col(&old_name).alias(&new_name));
        }
        df = lazy_df.collect()?;
    }

    // Volume often arrives as an integer column
    if df.schema().contains("volume") {
        let volume_f64 = df.column("volume")?.cast(&DataType::Float64)?;
        df.with_column(volume_f64)?;
    }

    Ok(df)
}
