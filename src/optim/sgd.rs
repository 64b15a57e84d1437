use crate::{layers::dense::Layer, math::matrix::Matrix};

/// Plain gradient descent; carries the learning rate.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one descent step to a layer given its averaged gradients.
    pub fn step(&self, layer: &mut Layer, weights_grad: &Matrix, biases_grad: &Matrix) {
        layer.apply_update(weights_grad, biases_grad, self.learning_rate);
    }
}
