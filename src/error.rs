//! Crate error types.

use thiserror::Error;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by network construction, validation and persistence.
///
/// Contract violations inside the numeric passes (mismatched vector
/// lengths, zero batch sizes) panic instead; see the module docs on
/// [`crate::feed_forward`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("a network needs at least two layers, got {0}")]
    TooFewLayers(usize),

    #[error("layer {0} has zero width")]
    EmptyLayer(usize),

    #[error("learning rate must be positive, got {0}")]
    InvalidLearningRate(f64),

    #[error("batch size must be nonzero and no larger than the example count")]
    BadBatchSize,

    #[error("example {index} has input length {input} and output length {output}")]
    BadExample {
        index: usize,
        input: usize,
        output: usize,
    },

    #[error("stored weights do not match the network topology")]
    WeightShapeMismatch,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
