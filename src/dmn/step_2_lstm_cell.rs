// External imports
use burn::module::Module;
use burn::nn::{Linear, LinearConfig};
use burn::tensor::{activation, backend::Backend, Tensor};

/// One LSTM layer with the four gate projections fused into a single
/// linear map per input source.
#[derive(Module, Debug)]
pub struct LstmLayer<B: Backend> {
    input_weights: Linear<B>,
    hidden_weights: Linear<B>,
}

/// Stacked unidirectional LSTM encoder.
///
/// Hidden and cell state are carried across the time steps within one
/// window only; every forward pass starts from zero state, so windows are
/// independent of each other.
#[derive(Module, Debug)]
pub struct Lstm<B: Backend> {
    input_size: usize,
    hidden_size: usize,
    layers: Vec<LstmLayer<B>>,
}

impl<B: Backend> Lstm<B> {
    /// Create a new LSTM encoder with `num_layers` stacked layers
    pub fn new(input_size: usize, hidden_size: usize, num_layers: usize, device: &B::Device) -> Self {
        let num_layers = num_layers.max(1);
        // input, forget, cell, output gates combined
        let gate_size = 4 * hidden_size;

        let mut layers = Vec::with_capacity(num_layers);
        for layer_idx in 0..num_layers {
            // Layer 0 consumes the feature vectors; deeper layers consume
            // the hidden sequence of the layer below
            let in_features = if layer_idx == 0 { input_size } else { hidden_size };
            layers.push(LstmLayer {
                input_weights: LinearConfig::new(in_features, gate_size).init(device),
                hidden_weights: LinearConfig::new(hidden_size, gate_size).init(device),
            });
        }

        Self {
            input_size,
            hidden_size,
            layers,
        }
    }

    /// Run one layer over a [batch, seq_len, features] sequence, producing
    /// the hidden-state sequence [batch, seq_len, hidden]
    fn process_layer(
        &self,
        layer: &LstmLayer<B>,
        x: Tensor<B, 3>,
        in_features: usize,
        device: &B::Device,
    ) -> Tensor<B, 3> {
        let batch_size = x.dims()[0];
        let seq_len = x.dims()[1];

        // Initial hidden and cell states (zeros)
        let mut h = Tensor::zeros([batch_size, self.hidden_size], device);
        let mut c = Tensor::zeros([batch_size, self.hidden_size], device);

        let mut output_sequence = Tensor::zeros([batch_size, seq_len, self.hidden_size], device);

        for t in 0..seq_len {
            let x_t = x
                .clone()
                .narrow(1, t, 1)
                .reshape([batch_size, in_features]);

            let gates = layer.input_weights.forward(x_t) + layer.hidden_weights.forward(h);

            // Split into the four gates, each [batch_size, hidden_size]
            let gates = gates.reshape([batch_size, 4, self.hidden_size]);
            let i_gate = gates
                .clone()
                .narrow(1, 0, 1)
                .reshape([batch_size, self.hidden_size]);
            let f_gate = gates
                .clone()
                .narrow(1, 1, 1)
                .reshape([batch_size, self.hidden_size]);
            let g_gate = gates
                .clone()
                .narrow(1, 2, 1)
                .reshape([batch_size, self.hidden_size]);
            let o_gate = gates
                .narrow(1, 3, 1)
                .reshape([batch_size, self.hidden_size]);

            let i = activation::sigmoid(i_gate);
            let f = activation::sigmoid(f_gate);
            let g = activation::tanh(g_gate);
            let o = activation::sigmoid(o_gate);

            c = f * c + i * g;
            h = o * activation::tanh(c.clone());

            output_sequence = output_sequence.slice_assign(
                [0..batch_size, t..t + 1, 0..self.hidden_size],
                h.clone()
                    .unsqueeze::<3>()
                    .reshape([batch_size, 1, self.hidden_size]),
            );
        }

        output_sequence
    }

    /// Forward pass through the full stack
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let device = x.device();
        let mut sequence = x;
        for (layer_idx, layer) in self.layers.iter().enumerate() {
            let in_features = if layer_idx == 0 {
                self.input_size
            } else {
                self.hidden_size
            };
            sequence = self.process_layer(layer, sequence, in_features, &device);
        }
        sequence
    }
}
