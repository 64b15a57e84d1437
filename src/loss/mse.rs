/// Mean squared error over one output row.
pub struct MseLoss;

impl MseLoss {
    /// Scalar MSE: `mean((predicted - expected)²)` over the output neurons.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let n = predicted.len() as f64;
        predicted
            .iter()
            .zip(expected.iter())
            .map(|(a, y)| (a - y) * (a - y))
            .sum::<f64>()
            / n
    }

    /// Per-output gradient of the mean: `(2 / n) * (predicted - expected)`.
    ///
    /// The `2/n` factor is the derivative of the squared term combined with
    /// the mean over the output width; the backward pass multiplies this by
    /// the sigmoid derivative to get the output delta.
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        let scale = 2.0 / predicted.len() as f64;
        predicted
            .iter()
            .zip(expected.iter())
            .map(|(a, y)| scale * (a - y))
            .collect()
    }
}
