use serde::{Deserialize, Serialize};

/// Describes a feed-forward network: input width, ordered hidden layer
/// widths, and output width.
///
/// Both the model and its gradient buffers are shaped from the same
/// descriptor, so the two can never disagree about topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Architecture {
    pub input_size: usize,
    pub hidden_sizes: Vec<usize>,
    pub output_size: usize,
}

impl Architecture {
    pub fn new(input_size: usize, hidden_sizes: Vec<usize>, output_size: usize) -> Architecture {
        Architecture {
            input_size,
            hidden_sizes,
            output_size,
        }
    }
}
