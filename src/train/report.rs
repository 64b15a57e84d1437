use serde::{Deserialize, Serialize};

/// Outcome of a `train_backprop` run.
///
/// Exhausting the epoch budget without reaching the convergence threshold is
/// an expected outcome, not an error: the model keeps whatever state it
/// reached and `converged` stays `false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Number of epochs actually executed.
    pub epochs_run: usize,
    /// Full-dataset cost after the last executed epoch.
    pub final_cost: f64,
    /// Whether a checkpoint saw the cost fall below the convergence threshold.
    pub converged: bool,
}
