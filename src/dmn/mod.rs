pub mod step_1_sequence_preparation;
pub mod step_2_lstm_cell;
pub mod step_3_dmn_model_arch;
pub mod step_4_train_model;
pub mod step_5_position_stream;
pub mod step_6_model_serialization;
