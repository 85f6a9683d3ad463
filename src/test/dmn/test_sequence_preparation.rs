// External imports
use burn_ndarray::{NdArray, NdArrayDevice};
use ndarray::Array2;
use polars::prelude::*;

// Internal imports
use crate::constants::{FEATURE_COLUMNS, SEQUENCE_LENGTH};
use crate::dmn::step_1_sequence_preparation::{
    create_sequences, dataframe_to_tensors, forward_return_series, split_data, MinMaxScaler,
};
use crate::error::PipelineError;
use crate::util::test_utils::generate_feature_dataframe;

type TestBackend = NdArray<f32>;

#[test]
fn test_create_sequences_counts_shapes_and_targets() {
    // Row-major ramp so every cell is distinct and predictable
    let matrix = Array2::from_shape_fn((8, 3), |(row, col)| (row * 3 + col) as f64);
    let target_col = 1;

    let (windows, targets) = create_sequences(matrix.view(), 3, target_col).unwrap();

    assert_eq!(windows.dim(), (5, 3, 3), "8 rows with L=3 give 5 windows");
    assert_eq!(targets.len(), 5);

    for i in 0..5 {
        // Window i covers rows [i, i+3)
        assert_eq!(windows[[i, 0, 0]], matrix[[i, 0]]);
        assert_eq!(windows[[i, 2, 2]], matrix[[i + 2, 2]]);
        // Target is the designated column at the row just past the window
        assert_eq!(targets[i], matrix[[i + 3, target_col]]);
    }
}

#[test]
fn test_create_sequences_requires_more_rows_than_the_window() {
    let matrix = Array2::from_elem((5, 2), 1.0);

    let err = create_sequences(matrix.view(), 5, 0).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientData(_)));

    let err = create_sequences(matrix.view(), 7, 0).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientData(_)));
}

#[test]
fn test_create_sequences_rejects_bad_target_column() {
    let matrix = Array2::from_elem((6, 2), 1.0);
    let err = create_sequences(matrix.view(), 2, 5).unwrap_err();
    assert!(matches!(err, PipelineError::InvalidParameter(_)));
}

fn two_column_frame(close: &[f64], volume: &[f64]) -> DataFrame {
    DataFrame::new(vec![
        Series::new("close".into(), close.to_vec()).into(),
        Series::new("volume".into(), volume.to_vec()).into(),
    ])
    .unwrap()
}

#[test]
fn test_scaler_maps_the_fitted_range_to_the_unit_interval() {
    let train = two_column_frame(&[0.0, 50.0, 100.0], &[10.0, 20.0, 30.0]);
    let scaler = MinMaxScaler::fit(&train, &["close", "volume"]).unwrap();
    let matrix = scaler.transform(&train).unwrap();

    assert_eq!(matrix[[0, 0]], 0.0);
    assert_eq!(matrix[[1, 0]], 0.5);
    assert_eq!(matrix[[2, 0]], 1.0);
    assert_eq!(matrix[[1, 1]], 0.5);
}

#[test]
fn test_scaler_is_reused_not_refitted_on_evaluation_data() {
    let train = two_column_frame(&[0.0, 50.0, 100.0], &[10.0, 20.0, 30.0]);
    let scaler = MinMaxScaler::fit(&train, &["close", "volume"]).unwrap();

    // Evaluation data outside the fitted range must map outside [0, 1];
    // a refit would silently squash it back into the unit interval
    let eval = two_column_frame(&[200.0, 100.0], &[30.0, 10.0]);
    let matrix = scaler.transform(&eval).unwrap();

    assert_eq!(matrix[[0, 0]], 2.0);
    assert_eq!(matrix[[1, 0]], 1.0);

    let refit = MinMaxScaler::fit(&eval, &["close", "volume"]).unwrap();
    let refit_matrix = refit.transform(&eval).unwrap();
    assert_eq!(refit_matrix[[0, 0]], 1.0, "a refit behaves differently");
}

#[test]
fn test_scaler_constant_column_maps_to_zero() {
    let train = two_column_frame(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]);
    let scaler = MinMaxScaler::fit(&train, &["close", "volume"]).unwrap();
    let matrix = scaler.transform(&train).unwrap();

    for row in 0..3 {
        assert_eq!(matrix[[row, 0]], 0.0);
    }
}

#[test]
fn test_scaler_survives_a_serde_round_trip() {
    let train = two_column_frame(&[0.0, 50.0, 100.0], &[10.0, 20.0, 30.0]);
    let scaler = MinMaxScaler::fit(&train, &["close", "volume"]).unwrap();

    let json = serde_json::to_string(&scaler).unwrap();
    let restored: MinMaxScaler = serde_json::from_str(&json).unwrap();

    let eval = two_column_frame(&[75.0], &[15.0]);
    assert_eq!(
        scaler.transform(&eval).unwrap(),
        restored.transform(&eval).unwrap()
    );
}

#[test]
fn test_scaler_resolves_target_by_name_not_position() {
    let train = two_column_frame(&[0.0, 1.0], &[2.0, 3.0]);
    let scaler = MinMaxScaler::fit(&train, &["volume", "close"]).unwrap();

    // "close" is fitted second here, and the index follows the name
    assert_eq!(scaler.column_index("close").unwrap(), 1);
    assert!(matches!(
        scaler.column_index("vwap"),
        Err(PipelineError::InvalidParameter(_))
    ));
}

#[test]
fn test_forward_returns_align_with_windows() {
    let close = [10.0, 20.0, 40.0, 50.0];
    let returns = forward_return_series(&close, 2).unwrap();

    // Window [0, 2) trades close[1] -> close[2]; window [1, 3) trades
    // close[2] -> close[3]
    assert_eq!(returns.len(), 2);
    assert!((returns[0] - 1.0).abs() < 1e-12);
    assert!((returns[1] - 0.25).abs() < 1e-12);
}

#[test]
fn test_forward_returns_flag_zero_prices_without_panicking() {
    let close = [10.0, 0.0, 5.0];
    let returns = forward_return_series(&close, 1).unwrap();
    assert!(!returns[0].is_finite() || !returns[1].is_finite());
}

#[test]
fn test_dataframe_to_tensors_shapes() {
    let device = NdArrayDevice::Cpu;
    let df = generate_feature_dataframe(80, 11).unwrap();
    let scaler = MinMaxScaler::fit(&df, &FEATURE_COLUMNS).unwrap();

    let (features, targets) =
        dataframe_to_tensors::<TestBackend>(&df, &scaler, SEQUENCE_LENGTH, &device).unwrap();

    let n_windows = df.height() - SEQUENCE_LENGTH;
    assert_eq!(
        features.dims(),
        [n_windows, SEQUENCE_LENGTH, FEATURE_COLUMNS.len()]
    );
    assert_eq!(targets.dims(), [n_windows]);
}

#[test]
fn test_split_data_keeps_the_chronological_tail_for_validation() {
    let df = generate_feature_dataframe(114, 3).unwrap();
    let (train, val) = split_data(&df, 0.2).unwrap();

    assert_eq!(train.height() + val.height(), df.height());
    assert_eq!(train.height(), (df.height() as f64 * 0.8) as usize);

    // The first validation row follows the last training row
    let train_last = train.column("close").unwrap().f64().unwrap();
    let full = df.column("close").unwrap().f64().unwrap();
    assert_eq!(
        train_last.get(train.height() - 1),
        full.get(train.height() - 1)
    );
}
