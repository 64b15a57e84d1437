pub mod backprop;
pub mod epoch_stats;
pub mod gradients;
pub mod report;
pub mod train_config;

pub use backprop::train_backprop;
pub use epoch_stats::EpochStats;
pub use gradients::GradientBuffers;
pub use report::TrainingReport;
pub use train_config::TrainConfig;
