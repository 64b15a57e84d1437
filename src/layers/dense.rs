use rand::distributions::{Distribution, Uniform};

use crate::math::matrix::Matrix;

/// One affine-transform + sigmoid stage of a feed-forward network.
///
/// Owns a weight matrix of shape `input_size × output_size`, a `1 × output_size`
/// bias row, and a `1 × output_size` cached activation row that is overwritten
/// on every [`activate`](Layer::activate) call.
///
/// After construction the only mutation path for the parameters is
/// [`apply_update`](Layer::apply_update); the training engine is the single
/// writer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub(crate) weights: Matrix,
    pub(crate) biases: Matrix,
    pub(crate) activations: Matrix,
}

impl Layer {
    /// Creates a layer taking `input_size` values and producing `output_size`
    /// activations.
    ///
    /// With `randomize` set, weights are drawn from the Xavier/Glorot uniform
    /// distribution `U(-limit, limit)` with `limit = sqrt(6 / (fan_in + fan_out))`,
    /// which keeps activation variance stable through sigmoid layers. Biases
    /// start at zero either way.
    pub fn new(input_size: usize, output_size: usize, randomize: bool) -> Layer {
        let mut weights = Matrix::zeros(input_size, output_size);

        if randomize && input_size > 0 && output_size > 0 {
            let limit = (6.0 / (input_size + output_size) as f64).sqrt();
            let dist = Uniform::new(-limit, limit);
            let mut rng = rand::thread_rng();
            for row in 0..input_size {
                for col in 0..output_size {
                    *weights.at_mut(row, col) = dist.sample(&mut rng);
                }
            }
        }

        Layer {
            weights,
            biases: Matrix::zeros(1, output_size),
            activations: Matrix::zeros(1, output_size),
        }
    }

    /// Creates a layer whose input width is the output width of `previous`.
    pub fn after(previous: &Layer, output_size: usize, randomize: bool) -> Layer {
        Layer::new(previous.output_size(), output_size, randomize)
    }

    /// Creates a layer whose input width is the column count of an input row.
    pub fn for_input(input: &Matrix, output_size: usize, randomize: bool) -> Layer {
        Layer::new(input.cols(), output_size, randomize)
    }

    /// Number of values this layer consumes.
    pub fn input_size(&self) -> usize {
        self.weights.rows()
    }

    /// Number of activations this layer produces.
    pub fn output_size(&self) -> usize {
        self.weights.cols()
    }

    pub fn weights(&self) -> &Matrix {
        &self.weights
    }

    pub fn biases(&self) -> &Matrix {
        &self.biases
    }

    /// The activations cached by the most recent [`activate`](Layer::activate) call.
    pub fn activations(&self) -> &Matrix {
        &self.activations
    }

    /// Computes `activations = sigmoid(input · weights + biases)`.
    ///
    /// The cached activation row doubles as the dot-product destination, so no
    /// allocation happens per call.
    ///
    /// # Panics
    /// Panics if `input` is not a `1 × input_size` row.
    pub fn activate(&mut self, input: &Matrix) {
        input.dot(&self.weights, &mut self.activations);
        self.activations.add_assign_from(&self.biases);
        self.activations.activate();
    }

    /// Same as [`activate`](Layer::activate), reading the previous layer's
    /// cached activations as the input row.
    pub fn activate_from(&mut self, previous: &Layer) {
        previous.activations.dot(&self.weights, &mut self.activations);
        self.activations.add_assign_from(&self.biases);
        self.activations.activate();
    }

    /// Gradient-descent step: `weights -= rate * w_grad`, `biases -= rate * b_grad`.
    ///
    /// # Panics
    /// Panics if the gradient shapes do not match the parameter shapes.
    pub fn apply_update(&mut self, w_grad: &Matrix, b_grad: &Matrix, rate: f64) {
        assert!(
            w_grad.rows() == self.weights.rows() && w_grad.cols() == self.weights.cols(),
            "weight gradient should be {}x{}, got {}x{}",
            self.weights.rows(),
            self.weights.cols(),
            w_grad.rows(),
            w_grad.cols()
        );
        assert!(
            b_grad.rows() == 1 && b_grad.cols() == self.biases.cols(),
            "bias gradient should be 1x{}, got {}x{}",
            self.biases.cols(),
            b_grad.rows(),
            b_grad.cols()
        );

        for row in 0..self.weights.rows() {
            for col in 0..self.weights.cols() {
                *self.weights.at_mut(row, col) -= rate * w_grad.at(row, col);
            }
        }
        for col in 0..self.biases.cols() {
            *self.biases.at_mut(0, col) -= rate * b_grad.at(0, col);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_follow_the_constructor_arguments() {
        let layer = Layer::new(3, 4, false);
        assert_eq!(layer.input_size(), 3);
        assert_eq!(layer.output_size(), 4);
        assert_eq!(layer.weights().rows(), 3);
        assert_eq!(layer.weights().cols(), 4);
        assert_eq!(layer.biases().cols(), 4);
        assert_eq!(layer.activations().cols(), 4);
    }

    #[test]
    fn chained_constructors_infer_input_width() {
        let first = Layer::new(2, 5, false);
        let second = Layer::after(&first, 3, false);
        assert_eq!(second.input_size(), 5);

        let input = Matrix::zeros(1, 7);
        let from_input = Layer::for_input(&input, 4, false);
        assert_eq!(from_input.input_size(), 7);
    }

    #[test]
    fn xavier_init_respects_the_fan_bound() {
        let layer = Layer::new(10, 20, true);
        let limit = (6.0 / 30.0_f64).sqrt();
        for &w in layer.weights().as_slice() {
            assert!(w.abs() <= limit, "weight {w} outside ±{limit}");
        }
        // Biases stay at zero regardless of randomize.
        assert!(layer.biases().as_slice().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn zero_initialized_layer_outputs_one_half() {
        // With zero weights and biases, z = 0 and sigmoid(0) = 0.5 everywhere.
        let mut layer = Layer::new(3, 2, false);
        let input = Matrix::from_rows(vec![vec![0.7, -1.2, 3.0]]).unwrap();
        layer.activate(&input);
        assert_eq!(layer.activations().as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn activate_matches_manual_computation() {
        let mut layer = Layer::new(2, 1, false);
        *layer.weights.at_mut(0, 0) = 0.5;
        *layer.weights.at_mut(1, 0) = -0.25;
        *layer.biases.at_mut(0, 0) = 0.1;

        let input = Matrix::from_rows(vec![vec![2.0, 4.0]]).unwrap();
        layer.activate(&input);

        let z: f64 = 2.0 * 0.5 + 4.0 * (-0.25) + 0.1;
        let expected = 1.0 / (1.0 + (-z).exp());
        assert!((layer.activations().at(0, 0) - expected).abs() < 1e-12);
    }

    #[test]
    fn apply_update_descends_the_gradient() {
        let mut layer = Layer::new(1, 1, false);
        let w_grad = Matrix::from_rows(vec![vec![2.0]]).unwrap();
        let b_grad = Matrix::from_rows(vec![vec![4.0]]).unwrap();
        layer.apply_update(&w_grad, &b_grad, 0.5);
        assert_eq!(layer.weights().at(0, 0), -1.0);
        assert_eq!(layer.biases().at(0, 0), -2.0);
    }

    #[test]
    #[should_panic(expected = "weight gradient")]
    fn apply_update_rejects_mismatched_gradient() {
        let mut layer = Layer::new(2, 2, false);
        let w_grad = Matrix::zeros(3, 2);
        let b_grad = Matrix::zeros(1, 2);
        layer.apply_update(&w_grad, &b_grad, 0.1);
    }
}
