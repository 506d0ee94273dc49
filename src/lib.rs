//! Text-pair match classifier: similarity weights over tab-separated
//! datasets, n-gram features and an SDCA logistic regression.

pub mod classifier;
pub mod dataset;
pub mod distance;
pub mod errors;
pub mod logging;
pub mod pipeline;

pub use errors::{PipelineError, Result, WeightError};
