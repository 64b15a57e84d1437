/// Logistic sigmoid: `1 / (1 + e^-x)`. Maps every real into `(0, 1)`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative expressed in terms of the already-computed output
/// `a = sigmoid(x)`: `σ'(x) = a * (1 - a)`.
///
/// The backward pass only ever sees cached activations, never the
/// pre-activation values, so this is the form it needs.
pub fn sigmoid_derivative_from_output(a: f64) -> f64 {
    a * (1.0 - a)
}
