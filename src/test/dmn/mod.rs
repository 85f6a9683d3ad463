pub mod test_sequence_preparation;
