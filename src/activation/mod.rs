pub mod sigmoid;

pub use sigmoid::{sigmoid, sigmoid_derivative_from_output};
