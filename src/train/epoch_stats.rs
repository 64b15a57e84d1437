use serde::{Deserialize, Serialize};

/// Checkpoint statistics emitted by `train_backprop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `EpochStats` at every logging checkpoint. Receivers use
/// this to drive progress displays; the library itself never prints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epochs requested for this run.
    pub total_epochs: usize,
    /// Full-dataset mean squared error at this checkpoint.
    pub cost: f64,
}
