// External imports
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig};
use burn::prelude::Backend;
use burn::tensor::{activation, Tensor};

// Internal imports
use super::step_2_lstm_cell::Lstm;

/// Configuration for the deep momentum model.
///
/// Every dimension is explicit; nothing is inferred from the data that
/// happens to flow through.
#[derive(Debug, Clone)]
pub struct DeepMomentumModelConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    pub num_layers: usize,
    pub dropout_rate: f64,
}

impl DeepMomentumModelConfig {
    pub fn new(input_size: usize, hidden_size: usize) -> Self {
        Self {
            input_size,
            hidden_size,
            output_size: 1,
            num_layers: 1,
            dropout_rate: 0.0,
        }
    }

    /// Initialize the model on the given device
    pub fn init<B: Backend>(&self, device: &B::Device) -> DeepMomentumModel<B> {
        DeepMomentumModel {
            input_size: self.input_size,
            hidden_size: self.hidden_size,
            output_size: self.output_size,
            lstm: Lstm::new(self.input_size, self.hidden_size, self.num_layers, device),
            dropout: DropoutConfig::new(self.dropout_rate).init(),
            head: LinearConfig::new(self.hidden_size, self.output_size).init(device),
        }
    }
}

/// Recurrent policy network mapping a feature window to a trading position.
///
/// The LSTM encodes the window, the last time step is pooled, and a linear
/// head squashed through tanh emits the position. The tanh keeps the output
/// in the closed interval [-1, 1] for arbitrary input magnitudes, which is
/// what makes the downstream statistics meaningful as portfolio weights.
#[derive(Module, Debug)]
pub struct DeepMomentumModel<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    output_size: usize,
    lstm: Lstm<B>,
    dropout: Dropout,
    head: Linear<B>,
}

impl<B: Backend> DeepMomentumModel<B> {
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Forward pass: [batch, seq_len, features] -> [batch, output_size],
    /// each value in [-1, 1]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let encoded = self.lstm.forward(x);

        let batch_size = encoded.dims()[0];
        let last_step_idx = encoded.dims()[1] - 1;
        let pooled = encoded
            .narrow(1, last_step_idx, 1)
            .reshape([batch_size, self.hidden_size]);

        let dropped = self.dropout.forward(pooled);
        activation::tanh(self.head.forward(dropped))
    }

    /// Forward pass flattened to one position per window
    pub fn forward_positions(&self, x: Tensor<B, 3>) -> Tensor<B, 1> {
        let batch_size = x.dims()[0];
        self.forward(x).reshape([batch_size])
    }
}
