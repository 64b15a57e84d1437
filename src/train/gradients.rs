use crate::math::matrix::Matrix;
use crate::network::network::Network;

/// Reusable gradient accumulators for one network: a weight- and bias-gradient
/// matrix per layer (hidden and output) plus a delta row per layer.
///
/// Shaped directly from the model's layers at construction, so no runtime
/// topology comparison is ever needed. Allocated once before the epoch loop
/// and zeroed at the start of every epoch; nothing carries meaning across
/// epochs.
pub struct GradientBuffers {
    pub(crate) hidden_weights: Vec<Matrix>,
    pub(crate) hidden_biases: Vec<Matrix>,
    pub(crate) hidden_deltas: Vec<Matrix>,
    pub(crate) output_weights: Matrix,
    pub(crate) output_biases: Matrix,
    pub(crate) output_delta: Matrix,
}

impl GradientBuffers {
    /// Allocates zeroed buffers matching every parameter shape in `network`.
    pub fn for_network(network: &Network) -> GradientBuffers {
        let hidden_weights = network
            .hidden
            .iter()
            .map(|layer| Matrix::zeros(layer.weights().rows(), layer.weights().cols()))
            .collect();
        let hidden_biases = network
            .hidden
            .iter()
            .map(|layer| Matrix::zeros(1, layer.output_size()))
            .collect();
        let hidden_deltas = network
            .hidden
            .iter()
            .map(|layer| Matrix::zeros(1, layer.output_size()))
            .collect();

        GradientBuffers {
            hidden_weights,
            hidden_biases,
            hidden_deltas,
            output_weights: Matrix::zeros(
                network.output.weights().rows(),
                network.output.weights().cols(),
            ),
            output_biases: Matrix::zeros(1, network.output.output_size()),
            output_delta: Matrix::zeros(1, network.output.output_size()),
        }
    }

    /// Zeroes every accumulator. Deltas are fully rewritten per sample and do
    /// not need clearing.
    pub fn zero(&mut self) {
        for gradient in &mut self.hidden_weights {
            gradient.fill(0.0);
        }
        for gradient in &mut self.hidden_biases {
            gradient.fill(0.0);
        }
        self.output_weights.fill(0.0);
        self.output_biases.fill(0.0);
    }

    /// Divides every accumulated gradient by `sample_count`, turning batch
    /// sums into batch means.
    pub fn average(&mut self, sample_count: usize) {
        let inverse = 1.0 / sample_count as f64;
        for gradient in &mut self.hidden_weights {
            gradient.scale(inverse);
        }
        for gradient in &mut self.hidden_biases {
            gradient.scale(inverse);
        }
        self.output_weights.scale(inverse);
        self.output_biases.scale(inverse);
    }
}
