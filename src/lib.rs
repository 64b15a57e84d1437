pub mod activation;
pub mod layers;
pub mod loss;
pub mod math;
pub mod network;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use layers::dense::Layer;
pub use loss::mse::MseLoss;
pub use math::matrix::{Matrix, MatrixError};
pub use network::architecture::Architecture;
pub use network::network::Network;
pub use optim::sgd::Sgd;
pub use train::backprop::train_backprop;
pub use train::epoch_stats::EpochStats;
pub use train::report::TrainingReport;
pub use train::train_config::TrainConfig;
