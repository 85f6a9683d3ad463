// Feature column names, in the order they enter the model input
pub const FEATURE_COLUMNS: [&str; 9] = [
    "open",
    "high",
    "low",
    "close",
    "volume",
    "sma",
    "macd",
    "rsi",
    "lag_return",
];

// Column whose next-step value is the window target
pub const TARGET_COLUMN: &str = "close";

// Model parameters
pub const SEQUENCE_LENGTH: usize = 10; // Number of time steps to look back

// Indicator window defaults
pub const DEFAULT_SHORT_WINDOW: usize = 12;
pub const DEFAULT_LONG_WINDOW: usize = 26;
pub const DEFAULT_RSI_WINDOW: usize = 14;
pub const DEFAULT_RETURN_LAG: usize = 1;

// Training defaults
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0;
pub const VALIDATION_SPLIT_RATIO: f64 = 0.2; // 20% of data for validation

// Model paths
pub const MODEL_PATH: &str = "models";
pub const MODEL_FILE_NAME: &str = "_dmn_model";
