use crate::layers::dense::Layer;
use crate::loss::mse::MseLoss;
use crate::math::matrix::Matrix;
use crate::network::architecture::Architecture;

/// An ordered stack of hidden layers plus a distinguished output layer.
///
/// Invariant: every adjacent pair of layers agrees on its shared width —
/// `layer[i + 1].input_size() == layer[i].output_size()` — guaranteed by
/// construction from an [`Architecture`] and never changed afterwards.
pub struct Network {
    pub(crate) hidden: Vec<Layer>,
    pub(crate) output: Layer,
}

impl Network {
    /// Builds the layer chain described by `architecture`. Each hidden layer
    /// infers its input width from its predecessor; the output layer hangs off
    /// the last hidden layer, or directly off the input when there are none.
    pub fn new(architecture: &Architecture, randomize: bool) -> Network {
        let mut hidden: Vec<Layer> = Vec::with_capacity(architecture.hidden_sizes.len());

        let mut previous_width = architecture.input_size;
        for &size in &architecture.hidden_sizes {
            hidden.push(Layer::new(previous_width, size, randomize));
            previous_width = size;
        }

        let output = Layer::new(previous_width, architecture.output_size, randomize);

        Network { hidden, output }
    }

    /// Width of the input rows this network consumes.
    pub fn input_size(&self) -> usize {
        self.hidden
            .first()
            .map_or(self.output.input_size(), Layer::input_size)
    }

    /// Width of the output rows this network produces.
    pub fn output_size(&self) -> usize {
        self.output.output_size()
    }

    /// The hidden layer stack, in forward order.
    pub fn hidden_layers(&self) -> &[Layer] {
        &self.hidden
    }

    pub fn output_layer(&self) -> &Layer {
        &self.output
    }

    /// Runs a single-row forward pass and returns the output activation row.
    ///
    /// Each layer consumes the cached activations of its predecessor; the
    /// first hidden layer (or the output layer, if there are no hidden
    /// layers) consumes `input` directly.
    ///
    /// # Panics
    /// Panics if `input` is not a `1 × input_size` row.
    pub fn forward(&mut self, input: &Matrix) -> &Matrix {
        assert!(
            input.rows() == 1 && input.cols() == self.input_size(),
            "forward expects a 1x{} input row, got {}x{}",
            self.input_size(),
            input.rows(),
            input.cols()
        );

        if self.hidden.is_empty() {
            self.output.activate(input);
            return self.output.activations();
        }

        self.hidden[0].activate(input);
        for i in 1..self.hidden.len() {
            let (done, todo) = self.hidden.split_at_mut(i);
            todo[0].activate_from(&done[i - 1]);
        }
        self.output.activate_from(&self.hidden[self.hidden.len() - 1]);
        self.output.activations()
    }

    /// Mean squared error of the model over a whole dataset: squared error
    /// summed over every sample row and output neuron, divided by
    /// `samples × output_width`.
    ///
    /// # Panics
    /// Panics unless `inputs.rows() == expected_outputs.rows()`.
    pub fn calculate_cost(&mut self, inputs: &Matrix, expected_outputs: &Matrix) -> f64 {
        assert!(
            inputs.rows() == expected_outputs.rows(),
            "cost: {} input rows but {} expected output rows",
            inputs.rows(),
            expected_outputs.rows()
        );

        let samples = inputs.rows();
        if samples == 0 {
            return 0.0;
        }

        let mut total = 0.0;
        for sample in 0..samples {
            let input = inputs.sub_matrix(sample, 0, 1, inputs.cols());
            self.forward(&input);
            total += MseLoss::loss(
                self.output.activations().row(0),
                expected_outputs.row(sample),
            );
        }

        total / samples as f64
    }
}
