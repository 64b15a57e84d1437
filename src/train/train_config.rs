use std::sync::mpsc;

use crate::train::epoch_stats::EpochStats;

/// Cost below which a logging checkpoint ends training early.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-6;

/// Configuration for a `train_backprop` run.
///
/// # Fields
/// - `epochs`       — maximum number of full-batch passes over the dataset
/// - `log_interval` — recompute the dataset cost every this many epochs (the
///                    first and last epoch are always included); `0` disables
///                    checkpoints entirely, including the early exit
/// - `convergence_threshold` — cost level that counts as converged
/// - `progress_tx`  — optional channel sender; one `EpochStats` is sent per
///                    checkpoint. If the receiver is dropped the loop
///                    terminates early (clean shutdown).
pub struct TrainConfig {
    pub epochs: usize,
    pub log_interval: usize,
    pub convergence_threshold: f64,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
}

impl TrainConfig {
    /// Creates a config with the default convergence threshold and no
    /// progress channel.
    pub fn new(epochs: usize, log_interval: usize) -> Self {
        TrainConfig {
            epochs,
            log_interval,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            progress_tx: None,
        }
    }
}
